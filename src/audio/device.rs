//! Audio device data models.

/// An active audio endpoint.
///
/// The display name is the matching key across settings, the cache, and OS
/// calls; the ID is the opaque endpoint identifier the OS wants back when
/// switching defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Unique Windows endpoint ID (opaque string from IMMDevice::GetId)
    pub id: String,

    /// Human-readable device name (from device properties)
    pub name: String,
}

impl AudioDevice {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name }
    }

    /// Case-insensitive name match, the lookup rule used everywhere a
    /// settings value meets an OS-reported device.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFlow {
    /// Render endpoints (speakers, headphones)
    Playback,

    /// Capture endpoints (microphones)
    Capture,
}

/// Audio device role (maps to Windows ERole).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DeviceRole {
    /// Games, system sounds, most general applications
    Console = 0,

    /// Music players, video players
    Multimedia = 1,

    /// Teams, Zoom, Discord, and other VoIP applications
    Communications = 2,
}

/// Audio service error types.
#[cfg(windows)]
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("COM initialization failed: {0}")]
    ComInitFailed(#[source] windows::core::Error),

    #[error("Failed to enumerate devices: {0}")]
    EnumerationFailed(#[source] windows::core::Error),

    #[error("Failed to set default device: {0}")]
    SetDefaultFailed(#[source] windows::core::Error),

    #[error("String conversion error: {0}")]
    StringConversion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_match_ignores_case() {
        let device = AudioDevice::new("{id}".to_string(), "Speakers (USB)".to_string());
        assert!(device.name_matches("speakers (usb)"));
        assert!(device.name_matches("SPEAKERS (USB)"));
        assert!(!device.name_matches("Speakers"));
    }
}
