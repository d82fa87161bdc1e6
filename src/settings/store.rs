//! File-backed settings store.
//!
//! All reads tolerate a missing or corrupt file: the caller always gets a
//! usable value, falling back to defaults. Writes are synchronous on the
//! calling thread and rewrite the whole file as indented JSON.

use super::model::Settings;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const SETTINGS_FILE: &str = "settings.json";

/// Settings store error types. Loading never fails; these cover saving.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings validation failed: {0}")]
    Validation(String),

    #[error("failed to write settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value and structured persistence over `settings.json`.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store over `settings.json` beside the executable, falling
    /// back to the working directory if the executable path is unknown.
    pub fn new() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: dir.join(SETTINGS_FILE),
        }
    }

    /// Create a store over an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the settings file exists on disk. Absence signals first run.
    pub fn file_exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the backing object. Missing or malformed files are treated as an
    /// empty record, never an error.
    fn read_map(&self) -> Map<String, Value> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return Map::new(),
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "settings file is not a JSON object, starting fresh");
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(&Value::Object(map.clone()))?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Get a string value by key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.read_map().get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }

    /// Get a string value by key, or the default if missing.
    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get a boolean value by key. Accepts native booleans and the string
    /// forms older files used ("True"/"False").
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.read_map().get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// Get a list of strings by key. Accepts a native array and the
    /// string-encoded array older files used.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.read_map().get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) => {
                serde_json::from_str::<Vec<String>>(s).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// Store a string value under a key, rewriting the whole file.
    pub fn set_string(&self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.to_string(), Value::String(value.to_string()));
        if let Err(e) = self.write_map(&map) {
            warn!(key, error = %e, "failed to persist setting");
        }
    }

    /// Store a boolean value under a key.
    pub fn set_bool(&self, key: &str, value: bool) {
        let mut map = self.read_map();
        map.insert(key.to_string(), Value::Bool(value));
        if let Err(e) = self.write_map(&map) {
            warn!(key, error = %e, "failed to persist setting");
        }
    }

    /// Store a list of strings under a key.
    pub fn set_string_list(&self, key: &str, values: &[String]) {
        let mut map = self.read_map();
        map.insert(
            key.to_string(),
            Value::Array(values.iter().cloned().map(Value::String).collect()),
        );
        if let Err(e) = self.write_map(&map) {
            warn!(key, error = %e, "failed to persist setting");
        }
    }

    /// Load the structured settings record.
    ///
    /// First tries to parse the whole file as the structured schema. On
    /// failure the record is reconstructed field by field from individual
    /// keys, which also covers files written by older versions that stored
    /// booleans and lists as strings. Never fails: a missing or malformed
    /// file yields a default-filled record.
    pub fn load(&self) -> Settings {
        if let Ok(text) = fs::read_to_string(&self.path) {
            match serde_json::from_str::<Settings>(&text) {
                Ok(settings) => return settings,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e,
                        "structured settings parse failed, rebuilding from keys");
                }
            }
        } else {
            return Settings::default();
        }

        self.load_from_keys()
    }

    fn load_from_keys(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            output_hotkey: self.get_string_or("outputHotkey", &defaults.output_hotkey),
            input_hotkey: self.get_string_or("inputHotkey", &defaults.input_hotkey),
            enabled_devices: self.get_string_list("enabledDevices"),
            enabled_input_devices: self.get_string_list("enabledInputDevices"),
            start_with_windows: self.get_bool("startWithWindows", defaults.start_with_windows),
            show_notifications: self.get_bool("showNotifications", defaults.show_notifications),
            auto_update_enabled: self.get_bool("autoUpdateEnabled", defaults.auto_update_enabled),
            default_playback: self.get_string_or("defaultPlayback", ""),
            default_input: self.get_string_or("defaultInput", ""),
            last_update_check: self.get_string_or("lastUpdateCheck", ""),
        }
    }

    /// Validate and save the structured settings record as indented JSON.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let errors = settings.validate();
        if !errors.is_empty() {
            return Err(SettingsError::Validation(errors.join(", ")));
        }

        let text = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::with_path(dir.path().join(SETTINGS_FILE))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.file_exists());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json at all").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let settings = Settings {
            output_hotkey: "Ctrl+Alt+F5".to_string(),
            enabled_devices: vec!["Speakers".to_string(), "Headphones".to_string()],
            default_playback: "Speakers".to_string(),
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert!(store.file_exists());
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_rejects_empty_hotkeys() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let settings = Settings {
            output_hotkey: String::new(),
            ..Settings::default()
        };
        match store.save(&settings) {
            Err(SettingsError::Validation(msg)) => {
                assert!(msg.contains("Output hotkey"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!store.file_exists());
    }

    #[test]
    fn key_access_reads_and_writes_through() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set_string("outputHotkey", "Ctrl+F9");
        store.set_bool("showNotifications", false);
        store.set_string_list("enabledDevices", &["A".to_string(), "B".to_string()]);

        assert_eq!(store.get_string("outputHotkey").as_deref(), Some("Ctrl+F9"));
        assert!(!store.get_bool("showNotifications", true));
        assert_eq!(store.get_string_list("enabledDevices"), ["A", "B"]);
        assert_eq!(store.get_string("missing"), None);
        assert_eq!(store.get_string_or("missing", "fallback"), "fallback");
    }

    #[test]
    fn legacy_string_encoded_values_still_load() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{
                "outputHotkey": "Ctrl+F1",
                "showNotifications": "True",
                "enabledDevices": "[\"Speakers\",\"Monitor\"]"
            }"#,
        )
        .unwrap();

        let settings = store.load();
        assert_eq!(settings.output_hotkey, "Ctrl+F1");
        assert!(settings.show_notifications);
        assert_eq!(settings.enabled_devices, ["Speakers", "Monitor"]);
        // untouched fields come from defaults
        assert_eq!(settings.input_hotkey, "Ctrl+Shift+F2");
    }

    #[test]
    fn set_preserves_unrelated_keys() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set_string("defaultPlayback", "Speakers");
        store.set_string("defaultInput", "Microphone");
        assert_eq!(
            store.get_string("defaultPlayback").as_deref(),
            Some("Speakers")
        );
        assert_eq!(
            store.get_string("defaultInput").as_deref(),
            Some("Microphone")
        );
    }
}
