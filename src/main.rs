#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Composition root: constructs one instance of each service, wires the
//! channels between them, and runs the UI loop.

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    run::run()
}

#[cfg(not(windows))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("AudioToggle only runs on Windows");
}

#[cfg(windows)]
mod run {
    use anyhow::{anyhow, Context};
    use audio_toggle_rs::audio::{AudioDeviceService, ComGuard, DeviceFlow};
    use audio_toggle_rs::controller::CyclingController;
    use audio_toggle_rs::hotkey::{parse_chord, HotkeyService, HotkeySlot};
    use audio_toggle_rs::platform::{SingleInstanceGuard, StartupManager};
    use audio_toggle_rs::settings::SettingsStore;
    use audio_toggle_rs::update::{should_check_today, today_stamp, UpdateInfo, UpdateService};
    use audio_toggle_rs::AudioToggleApp;
    use std::sync::mpsc::{channel, Sender};
    use std::sync::Arc;
    use tracing::{info, warn};
    use tracing_subscriber::EnvFilter;

    pub fn run() -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let Some(_instance) = SingleInstanceGuard::acquire().context("single instance check")?
        else {
            info!("another instance is already running, exiting");
            return Ok(());
        };

        // COM for the UI thread, held for the whole run.
        let _com = ComGuard::new().context("COM initialization")?;

        let store = Arc::new(SettingsStore::new());
        let first_run = !store.file_exists();
        let settings = store.load();

        let audio = Arc::new(AudioDeviceService::new().context("audio service")?);

        let (hotkeys, hotkey_rx) = HotkeyService::new().context("hotkey service")?;
        let output_status = register_saved_chord(
            &hotkeys,
            HotkeySlot::Output,
            &settings.output_hotkey,
            "Ctrl+Shift+F1",
        );
        let input_status = register_saved_chord(
            &hotkeys,
            HotkeySlot::Input,
            &settings.input_hotkey,
            "Ctrl+Shift+F2",
        );

        let (notice_tx, notice_rx) = channel();
        let controller = CyclingController::new(audio.clone(), store.clone(), notice_tx);

        let (update_tx, update_rx) = channel();
        if settings.auto_update_enabled
            && should_check_today(&settings.last_update_check, &today_stamp())
        {
            spawn_update_check(store.clone(), update_tx);
        }

        let options = eframe::NativeOptions {
            viewport: eframe::egui::ViewportBuilder::default()
                .with_title("AudioToggle Settings")
                .with_inner_size([520.0, 620.0])
                .with_min_inner_size([420.0, 420.0])
                .with_visible(first_run),
            ..Default::default()
        };

        eframe::run_native(
            "AudioToggle",
            options,
            Box::new(move |cc| {
                // Hotkey firings run the controller on their own dispatcher
                // thread, serially, one event at a time; the repaint call is
                // how the UI thread learns something changed.
                let ctx = cc.egui_ctx.clone();
                std::thread::Builder::new()
                    .name("cycle-dispatcher".to_string())
                    .spawn(move || {
                        let _com = match ComGuard::new() {
                            Ok(guard) => Some(guard),
                            Err(e) => {
                                warn!(error = %e, "dispatcher could not initialize COM");
                                None
                            }
                        };
                        for slot in hotkey_rx {
                            let flow = match slot {
                                HotkeySlot::Output => DeviceFlow::Playback,
                                HotkeySlot::Input => DeviceFlow::Capture,
                            };
                            controller.cycle(flow);
                            ctx.request_repaint();
                        }
                    })
                    .map_err(|e| format!("failed to spawn dispatcher thread: {e}"))?;

                Ok(Box::new(AudioToggleApp::new(
                    audio,
                    store,
                    hotkeys,
                    StartupManager::new(),
                    notice_rx,
                    update_rx,
                    settings,
                    [output_status, input_status],
                    first_run,
                )))
            }),
        )
        .map_err(|e| anyhow!("UI loop failed: {e}"))
    }

    /// Register the chord stored in settings, falling back to the default
    /// chord when the stored text does not parse. Returns the status
    /// annotation for the settings window, if registration failed.
    fn register_saved_chord(
        hotkeys: &HotkeyService,
        slot: HotkeySlot,
        saved: &str,
        fallback: &str,
    ) -> Option<String> {
        let chord = match parse_chord(saved).chord() {
            Some(chord) => chord,
            None => {
                warn!(?slot, text = saved, "saved hotkey does not parse, using default");
                match parse_chord(fallback).chord() {
                    Some(chord) => chord,
                    None => return Some("(Not supported)".to_string()),
                }
            }
        };

        match hotkeys.register(slot, chord) {
            Ok(()) => {
                info!(?slot, %chord, "registered hotkey");
                None
            }
            Err(e) => {
                warn!(?slot, %chord, error = %e, "hotkey registration failed");
                Some("(Failed to register)".to_string())
            }
        }
    }

    /// Daily update check on a background thread. Stamps `lastUpdateCheck`
    /// before the network call so a failing check still counts for today.
    fn spawn_update_check(store: Arc<SettingsStore>, updates: Sender<UpdateInfo>) {
        std::thread::Builder::new()
            .name("update-check".to_string())
            .spawn(move || {
                store.set_string("lastUpdateCheck", &today_stamp());
                let service = UpdateService::new();
                if let Some(info) = service.check_for_updates() {
                    if service.is_update_available(&info) {
                        info!(version = %info.version, "update available");
                        let _ = updates.send(info);
                    }
                }
            })
            .ok();
    }
}
