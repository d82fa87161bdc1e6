//! AudioToggle - Library
//!
//! A system tray utility for cycling the default audio playback and input
//! device on Windows.
//!
//! ## Features
//!
//! - Global hotkeys that cycle through user-selected playback/input devices
//! - Settings window for device selection and hotkey configuration
//! - Switch notification popup
//! - Start with Windows option
//! - Daily update check against GitHub releases
//!
//! The OS-facing modules are Windows only; the cycling logic, chord
//! parsing, settings store, and update metadata build everywhere.

#[cfg(windows)]
pub mod app;
pub mod audio;
pub mod controller;
pub mod hotkey;
pub mod platform;
pub mod settings;
#[cfg(windows)]
pub mod ui;
pub mod update;

#[cfg(windows)]
pub use app::AudioToggleApp;
pub use audio::{AudioDevice, DeviceFlow};
pub use controller::{next_device, AudioSwitching, CyclingController, SwitchNotice};
pub use hotkey::{parse_chord, HotKeyChord};
pub use settings::{Settings, SettingsStore};
pub use update::{UpdateInfo, UpdateService};
