//! Windows Registry autostart management.
//!
//! Registers the executable under the HKCU Run key so the application
//! launches at logon.

use thiserror::Error;
use windows::core::PCWSTR;
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SZ,
};

/// Autostart service error types.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to access registry: {0}")]
    RegistryAccess(String),

    #[error("Failed to update startup entry")]
    WriteFailed,

    #[error("Failed to determine executable path")]
    ExePathUnavailable,
}

/// Manages the "start with Windows" Run-key entry.
pub struct StartupManager {
    run_key_path: Vec<u16>,
    value_name: Vec<u16>,
}

impl StartupManager {
    const RUN_KEY: &'static str = r"Software\Microsoft\Windows\CurrentVersion\Run";
    const APP_NAME: &'static str = "AudioToggle";

    pub fn new() -> Self {
        Self {
            run_key_path: Self::to_wide(Self::RUN_KEY),
            value_name: Self::to_wide(Self::APP_NAME),
        }
    }

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Check whether the Run-key entry exists.
    pub fn is_enabled(&self) -> bool {
        unsafe {
            let mut hkey = HKEY::default();
            let result = RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                KEY_READ,
                &mut hkey,
            );

            if result.is_err() {
                return false;
            }

            let mut data_size = 0u32;
            let result = RegQueryValueExW(
                hkey,
                PCWSTR::from_raw(self.value_name.as_ptr()),
                None,
                None,
                None,
                Some(&mut data_size),
            );

            let _ = RegCloseKey(hkey);

            result.is_ok() && data_size > 0
        }
    }

    /// Add or remove the Run-key entry for the current executable.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), StartupError> {
        let command_wide = if enabled {
            let exe_path =
                std::env::current_exe().map_err(|_| StartupError::ExePathUnavailable)?;
            // Quoted so paths with spaces survive the shell
            Some(Self::to_wide(&format!("\"{}\"", exe_path.to_string_lossy())))
        } else {
            None
        };

        unsafe {
            let mut hkey = HKEY::default();
            let result = RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                KEY_WRITE,
                &mut hkey,
            );

            if result.is_err() {
                return Err(StartupError::RegistryAccess(
                    "Failed to open Run key".to_string(),
                ));
            }

            let result = if let Some(command_wide) = &command_wide {
                RegSetValueExW(
                    hkey,
                    PCWSTR::from_raw(self.value_name.as_ptr()),
                    0,
                    REG_SZ,
                    Some(std::slice::from_raw_parts(
                        command_wide.as_ptr() as *const u8,
                        command_wide.len() * 2,
                    )),
                )
            } else {
                RegDeleteValueW(hkey, PCWSTR::from_raw(self.value_name.as_ptr()))
            };

            let _ = RegCloseKey(hkey);

            // Deleting an absent value is a successful disable.
            if result.is_err() && enabled {
                Err(StartupError::WriteFailed)
            } else {
                Ok(())
            }
        }
    }
}

impl Default for StartupManager {
    fn default() -> Self {
        Self::new()
    }
}
