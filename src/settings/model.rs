//! The persisted settings record.

use serde::{Deserialize, Serialize};

/// Application settings, serialized as a single camelCase JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Hotkey chord for cycling output devices (e.g. "Ctrl+Shift+F1").
    pub output_hotkey: String,

    /// Hotkey chord for cycling input devices (e.g. "Ctrl+Shift+F2").
    pub input_hotkey: String,

    /// Output device names enabled for cycling; list order is cycling order.
    pub enabled_devices: Vec<String>,

    /// Input device names enabled for cycling; list order is cycling order.
    pub enabled_input_devices: Vec<String>,

    /// Register the application in the HKCU Run key.
    pub start_with_windows: bool,

    /// Show a popup when the default device changes.
    pub show_notifications: bool,

    /// Check GitHub for a newer release once per day.
    pub auto_update_enabled: bool,

    /// Last playback device this application switched to. Audit value only;
    /// the OS remains the authority on the actual default.
    pub default_playback: String,

    /// Last input device this application switched to.
    pub default_input: String,

    /// Date of the last update check, "YYYY-MM-DD".
    pub last_update_check: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_hotkey: "Ctrl+Shift+F1".to_string(),
            input_hotkey: "Ctrl+Shift+F2".to_string(),
            enabled_devices: Vec::new(),
            enabled_input_devices: Vec::new(),
            start_with_windows: false,
            show_notifications: true,
            auto_update_enabled: true,
            default_playback: String::new(),
            default_input: String::new(),
            last_update_check: String::new(),
        }
    }
}

impl Settings {
    /// Validate the record before saving. Returns one message per problem;
    /// an empty list means the record is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.output_hotkey.trim().is_empty() {
            errors.push("Output hotkey cannot be empty".to_string());
        }
        if self.input_hotkey.trim().is_empty() {
            errors.push("Input hotkey cannot be empty".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_valid() {
        assert!(Settings::default().validate().is_empty());
    }

    #[test]
    fn blank_hotkeys_are_rejected() {
        let settings = Settings {
            output_hotkey: "  ".to_string(),
            input_hotkey: String::new(),
            ..Settings::default()
        };
        let errors = settings.validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "outputHotkey",
            "inputHotkey",
            "enabledDevices",
            "enabledInputDevices",
            "startWithWindows",
            "showNotifications",
            "autoUpdateEnabled",
            "defaultPlayback",
            "defaultInput",
            "lastUpdateCheck",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"outputHotkey": "Ctrl+F9"}"#).unwrap();
        assert_eq!(settings.output_hotkey, "Ctrl+F9");
        assert_eq!(settings.input_hotkey, "Ctrl+Shift+F2");
        assert!(settings.show_notifications);
    }
}
