//! Application state and lifecycle management.
//!
//! `AudioToggleApp` owns the UI-facing state and routes events between the
//! tray, the settings window, the notification popup, and the services.
//! Switch notices and update results arrive over channels from background
//! threads; everything UI-mutating happens here on the egui thread.

use crate::audio::{AudioDeviceService, DeviceFlow};
use crate::controller::SwitchNotice;
use crate::hotkey::{parse_chord, HotkeyService, HotkeySlot};
use crate::platform::StartupManager;
use crate::settings::{Settings, SettingsStore};
use crate::ui::{
    DeviceEntry, MenuItemId, NotificationPopup, SettingsAction, SettingsPanel, SettingsView,
    TrayEvent, TrayManager,
};
use crate::update::UpdateInfo;
use eframe::egui;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Main application state.
pub struct AudioToggleApp {
    audio: Arc<AudioDeviceService>,
    store: Arc<SettingsStore>,
    hotkeys: HotkeyService,
    startup: StartupManager,

    tray: TrayManager,
    settings_panel: SettingsPanel,
    notification: NotificationPopup,

    notices: Receiver<SwitchNotice>,
    updates: Receiver<UpdateInfo>,

    /// In-memory mirror of the persisted record
    settings: Settings,

    output_devices: Vec<DeviceEntry>,
    input_devices: Vec<DeviceEntry>,

    settings_visible: bool,
    exiting: bool,
}

impl AudioToggleApp {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        audio: Arc<AudioDeviceService>,
        store: Arc<SettingsStore>,
        hotkeys: HotkeyService,
        startup: StartupManager,
        notices: Receiver<SwitchNotice>,
        updates: Receiver<UpdateInfo>,
        settings: Settings,
        hotkey_statuses: [Option<String>; 2],
        show_settings: bool,
    ) -> Self {
        let mut settings_panel = SettingsPanel::new(
            settings.output_hotkey.clone(),
            settings.input_hotkey.clone(),
        );
        let [output_status, input_status] = hotkey_statuses;
        settings_panel.set_hotkey_status(HotkeySlot::Output, output_status);
        settings_panel.set_hotkey_status(HotkeySlot::Input, input_status);

        let startup_enabled = startup.is_enabled();

        let mut tray = TrayManager::new();
        let tooltip = if settings.default_playback.is_empty() {
            "AudioToggle".to_string()
        } else {
            settings.default_playback.clone()
        };
        if let Err(e) = tray.create(&tooltip, startup_enabled) {
            error!(error = %e, "failed to create tray icon");
        }

        let mut app = Self {
            audio,
            store,
            hotkeys,
            startup,
            tray,
            settings_panel,
            notification: NotificationPopup::new(),
            notices,
            updates,
            settings,
            output_devices: Vec::new(),
            input_devices: Vec::new(),
            settings_visible: show_settings,
            exiting: false,
        };
        if show_settings {
            app.refresh_device_entries();
        }
        app
    }

    /// Rebuild the device checklists from a fresh enumeration.
    fn refresh_device_entries(&mut self) {
        self.output_devices = self.build_entries(DeviceFlow::Playback);
        self.input_devices = self.build_entries(DeviceFlow::Capture);
    }

    fn build_entries(&self, flow: DeviceFlow) -> Vec<DeviceEntry> {
        let names = match self.audio.device_names(flow) {
            Ok(names) => names,
            Err(e) => {
                warn!(?flow, error = %e, "device enumeration failed");
                Vec::new()
            }
        };
        let default = self
            .audio
            .default_device(flow)
            .ok()
            .flatten()
            .map(|d| d.name);
        let enabled = match flow {
            DeviceFlow::Playback => &self.settings.enabled_devices,
            DeviceFlow::Capture => &self.settings.enabled_input_devices,
        };

        names
            .into_iter()
            .map(|name| DeviceEntry {
                enabled: enabled.contains(&name),
                is_default: default.as_deref() == Some(name.as_str()),
                name,
            })
            .collect()
    }

    fn open_settings(&mut self, ctx: &egui::Context) {
        // Force a fresh enumeration while the window is up.
        self.audio.invalidate_cache();
        self.refresh_device_entries();
        self.settings_visible = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
    }

    fn hide_settings(&mut self, ctx: &egui::Context) {
        self.settings_visible = false;
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
    }

    fn handle_tray_event(&mut self, event: TrayEvent, ctx: &egui::Context) {
        match event {
            TrayEvent::LeftClick
            | TrayEvent::MenuItemClicked {
                id: MenuItemId::Settings,
            } => {
                self.open_settings(ctx);
            }
            TrayEvent::MenuItemClicked {
                id: MenuItemId::StartWithWindows,
            } => {
                let desired = !self.settings.start_with_windows;
                self.apply_startup_setting(desired);
            }
            TrayEvent::MenuItemClicked {
                id: MenuItemId::Exit,
            } => {
                self.exiting = true;
                self.tray.destroy();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn apply_startup_setting(&mut self, enabled: bool) {
        match self.startup.set_enabled(enabled) {
            Ok(()) => {
                self.settings.start_with_windows = enabled;
                self.store.set_bool("startWithWindows", enabled);
                self.tray.set_startup_checked(enabled);
            }
            Err(e) => {
                warn!(error = %e, "failed to change startup setting");
                // Leave the checkmark where the registry actually is.
                self.tray.set_startup_checked(self.startup.is_enabled());
            }
        }
    }

    fn handle_switch_notice(&mut self, notice: SwitchNotice) {
        let message = match notice.flow {
            DeviceFlow::Playback => {
                self.settings.default_playback = notice.device.clone();
                let _ = self.tray.set_tooltip(&notice.device);
                for entry in &mut self.output_devices {
                    entry.is_default = entry.name == notice.device;
                }
                notice.device
            }
            DeviceFlow::Capture => {
                self.settings.default_input = notice.device.clone();
                for entry in &mut self.input_devices {
                    entry.is_default = entry.name == notice.device;
                }
                format!("Input: {}", notice.device)
            }
        };

        if self.settings.show_notifications {
            self.notification.show_message(message);
        }
    }

    fn apply_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::SetDeviceEnabled {
                flow,
                name,
                enabled,
            } => {
                let (entries, list, key) = match flow {
                    DeviceFlow::Playback => (
                        &mut self.output_devices,
                        &mut self.settings.enabled_devices,
                        "enabledDevices",
                    ),
                    DeviceFlow::Capture => (
                        &mut self.input_devices,
                        &mut self.settings.enabled_input_devices,
                        "enabledInputDevices",
                    ),
                };
                if let Some(entry) = entries.iter_mut().find(|e| e.name == name) {
                    entry.enabled = enabled;
                }
                // The cycle order is the list order shown in the window.
                *list = entries
                    .iter()
                    .filter(|e| e.enabled)
                    .map(|e| e.name.clone())
                    .collect();
                self.store.set_string_list(key, list);
            }
            SettingsAction::ApplyHotkey { slot, text } => self.apply_hotkey(slot, &text),
            SettingsAction::SetStartWithWindows(enabled) => self.apply_startup_setting(enabled),
            SettingsAction::SetShowNotifications(enabled) => {
                self.settings.show_notifications = enabled;
                self.store.set_bool("showNotifications", enabled);
            }
            SettingsAction::SetAutoUpdate(enabled) => {
                self.settings.auto_update_enabled = enabled;
                self.store.set_bool("autoUpdateEnabled", enabled);
            }
        }
    }

    fn apply_hotkey(&mut self, slot: HotkeySlot, text: &str) {
        let Some(chord) = parse_chord(text).chord() else {
            self.settings_panel
                .set_hotkey_status(slot, Some("(Not supported)".to_string()));
            return;
        };

        match self.hotkeys.register(slot, chord) {
            Ok(()) => {
                let canonical = chord.to_string();
                let (key, mirror, buffer) = match slot {
                    HotkeySlot::Output => (
                        "outputHotkey",
                        &mut self.settings.output_hotkey,
                        &mut self.settings_panel.output_hotkey_text,
                    ),
                    HotkeySlot::Input => (
                        "inputHotkey",
                        &mut self.settings.input_hotkey,
                        &mut self.settings_panel.input_hotkey_text,
                    ),
                };
                *mirror = canonical.clone();
                *buffer = canonical.clone();
                self.store.set_string(key, &canonical);
                self.settings_panel
                    .set_hotkey_status(slot, Some("✓".to_string()));
            }
            Err(e) => {
                warn!(?slot, error = %e, "hotkey registration failed");
                self.settings_panel
                    .set_hotkey_status(slot, Some("(Failed to register)".to_string()));
            }
        }
    }
}

impl eframe::App for AudioToggleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tray.process_events();

        let mut tray_events = Vec::new();
        while let Ok(event) = self.tray.events().try_recv() {
            tray_events.push(event);
        }
        for event in tray_events {
            self.handle_tray_event(event, ctx);
        }

        while let Ok(notice) = self.notices.try_recv() {
            self.handle_switch_notice(notice);
        }

        while let Ok(info) = self.updates.try_recv() {
            self.notification
                .show_message(format!("Update {} is available", info.version));
        }

        // Closing the settings window hides it; only Exit ends the process.
        if ctx.input(|i| i.viewport().close_requested()) && !self.exiting {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.hide_settings(ctx);
        }

        if self.settings_visible {
            let view = SettingsView {
                output_devices: &self.output_devices,
                input_devices: &self.input_devices,
                start_with_windows: self.settings.start_with_windows,
                show_notifications: self.settings.show_notifications,
                auto_update_enabled: self.settings.auto_update_enabled,
                version: env!("CARGO_PKG_VERSION"),
            };
            self.settings_panel.show(ctx, &view);

            for action in self.settings_panel.take_actions() {
                self.apply_settings_action(action);
            }
        }

        self.notification.show(ctx);

        // Keep the loop ticking so tray events and channel messages are
        // picked up while the window is hidden.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
