//! UI module for the system tray, settings window, and switch notification.

pub mod notification;
pub mod settings_window;
pub mod tray;

pub use notification::NotificationPopup;
pub use settings_window::{DeviceEntry, SettingsAction, SettingsPanel, SettingsView};
pub use tray::{MenuItemId, TrayError, TrayEvent, TrayManager};
