//! Settings window content, rendered with egui.
//!
//! The panel is presentation only: it collects [`SettingsAction`] values
//! for the application loop to apply, and renders whatever view state the
//! loop hands back. Hotkey fields carry a status annotation (✓ or a
//! failure note) reflecting the last registration attempt.

use crate::audio::DeviceFlow;
use crate::hotkey::HotkeySlot;
use eframe::egui;

/// One device row in a checklist.
#[derive(Debug, Clone)]
pub struct DeviceEntry {
    pub name: String,
    pub enabled: bool,
    pub is_default: bool,
}

/// View state supplied by the application loop.
pub struct SettingsView<'a> {
    pub output_devices: &'a [DeviceEntry],
    pub input_devices: &'a [DeviceEntry],
    pub start_with_windows: bool,
    pub show_notifications: bool,
    pub auto_update_enabled: bool,
    pub version: &'a str,
}

/// Actions collected from the UI for the application loop to apply.
#[derive(Debug, Clone)]
pub enum SettingsAction {
    SetDeviceEnabled {
        flow: DeviceFlow,
        name: String,
        enabled: bool,
    },
    ApplyHotkey {
        slot: HotkeySlot,
        text: String,
    },
    SetStartWithWindows(bool),
    SetShowNotifications(bool),
    SetAutoUpdate(bool),
}

/// Settings window state.
pub struct SettingsPanel {
    /// Pending actions from the UI
    actions: Vec<SettingsAction>,

    /// Editable hotkey text buffers
    pub output_hotkey_text: String,
    pub input_hotkey_text: String,

    /// Annotations from the last registration attempt, per slot
    pub output_hotkey_status: Option<String>,
    pub input_hotkey_status: Option<String>,
}

impl SettingsPanel {
    pub fn new(output_hotkey: String, input_hotkey: String) -> Self {
        Self {
            actions: Vec::new(),
            output_hotkey_text: output_hotkey,
            input_hotkey_text: input_hotkey,
            output_hotkey_status: None,
            input_hotkey_status: None,
        }
    }

    /// Record the outcome of a registration attempt for display.
    pub fn set_hotkey_status(&mut self, slot: HotkeySlot, status: Option<String>) {
        match slot {
            HotkeySlot::Output => self.output_hotkey_status = status,
            HotkeySlot::Input => self.input_hotkey_status = status,
        }
    }

    /// Render the settings window content.
    pub fn show(&mut self, ctx: &egui::Context, view: &SettingsView<'_>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Playback devices");
                    ui.label("Checked devices are included in the cycle, in list order.");
                    ui.add_space(4.0);
                    self.render_device_list(ui, DeviceFlow::Playback, view.output_devices);

                    ui.add_space(12.0);
                    ui.separator();

                    ui.heading("Input devices");
                    ui.add_space(4.0);
                    self.render_device_list(ui, DeviceFlow::Capture, view.input_devices);

                    ui.add_space(12.0);
                    ui.separator();

                    ui.heading("Hotkeys");
                    ui.add_space(4.0);
                    let output_status = self.output_hotkey_status.clone();
                    let mut output_text = self.output_hotkey_text.clone();
                    Self::render_hotkey_row(
                        ui,
                        "Cycle output:",
                        &mut output_text,
                        &output_status,
                        HotkeySlot::Output,
                        &mut self.actions,
                    );
                    self.output_hotkey_text = output_text;

                    let input_status = self.input_hotkey_status.clone();
                    let mut input_text = self.input_hotkey_text.clone();
                    Self::render_hotkey_row(
                        ui,
                        "Cycle input:",
                        &mut input_text,
                        &input_status,
                        HotkeySlot::Input,
                        &mut self.actions,
                    );
                    self.input_hotkey_text = input_text;

                    ui.add_space(12.0);
                    ui.separator();

                    ui.heading("General");
                    ui.add_space(4.0);

                    let mut start_with_windows = view.start_with_windows;
                    if ui
                        .checkbox(&mut start_with_windows, "Start with Windows")
                        .changed()
                    {
                        self.actions
                            .push(SettingsAction::SetStartWithWindows(start_with_windows));
                    }

                    let mut show_notifications = view.show_notifications;
                    if ui
                        .checkbox(&mut show_notifications, "Show notifications when switching")
                        .changed()
                    {
                        self.actions
                            .push(SettingsAction::SetShowNotifications(show_notifications));
                    }

                    let mut auto_update = view.auto_update_enabled;
                    if ui
                        .checkbox(&mut auto_update, "Check for updates daily")
                        .changed()
                    {
                        self.actions.push(SettingsAction::SetAutoUpdate(auto_update));
                    }

                    ui.add_space(8.0);
                    ui.small(format!("AudioToggle {}", view.version));
                });
        });
    }

    fn render_device_list(
        &mut self,
        ui: &mut egui::Ui,
        flow: DeviceFlow,
        devices: &[DeviceEntry],
    ) {
        if devices.is_empty() {
            ui.label("No active devices detected");
            return;
        }

        for device in devices {
            ui.horizontal(|ui| {
                let mut enabled = device.enabled;
                if ui.checkbox(&mut enabled, "").changed() {
                    self.actions.push(SettingsAction::SetDeviceEnabled {
                        flow,
                        name: device.name.clone(),
                        enabled,
                    });
                }
                if device.is_default {
                    ui.colored_label(egui::Color32::GREEN, "●");
                }
                ui.label(&device.name);
            });
        }
    }

    fn render_hotkey_row(
        ui: &mut egui::Ui,
        label: &str,
        text: &mut String,
        status: &Option<String>,
        slot: HotkeySlot,
        actions: &mut Vec<SettingsAction>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.text_edit_singleline(text);
            if ui.button("Apply").clicked() {
                actions.push(SettingsAction::ApplyHotkey {
                    slot,
                    text: text.clone(),
                });
            }
            if let Some(status) = status {
                ui.label(status);
            }
        });
    }

    /// Take all pending actions.
    pub fn take_actions(&mut self) -> Vec<SettingsAction> {
        std::mem::take(&mut self.actions)
    }
}
