//! Device enumeration using the Windows MMDevice API.
//!
//! Provides COM initialization and enumeration of active render and capture
//! endpoints.

use super::device::{AudioDevice, AudioError, DeviceFlow, DeviceRole};
use windows::Win32::Devices::Properties::DEVPKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eCapture, eCommunications, eConsole, eMultimedia, eRender, EDataFlow, ERole, IMMDevice,
    IMMDeviceEnumerator, MMDeviceEnumerator, DEVICE_STATE_ACTIVE,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED, STGM,
};
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};

/// COM initialization guard that uninitializes COM on drop.
///
/// Every thread that talks to the audio service must hold one of these for
/// the duration of its COM use.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            // Apartment-threaded for UI compatibility
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(AudioError::ComInitFailed)?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

fn data_flow(flow: DeviceFlow) -> EDataFlow {
    match flow {
        DeviceFlow::Playback => eRender,
        DeviceFlow::Capture => eCapture,
    }
}

fn role(role: DeviceRole) -> ERole {
    match role {
        DeviceRole::Console => eConsole,
        DeviceRole::Multimedia => eMultimedia,
        DeviceRole::Communications => eCommunications,
    }
}

/// Device enumerator over the Windows MMDevice API.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    /// Create a new DeviceEnumerator.
    ///
    /// COM must be initialized on the current thread before calling this.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(AudioError::EnumerationFailed)?;

            Ok(Self { enumerator })
        }
    }

    /// All active devices for a flow, in OS enumeration order.
    pub fn active_devices(&self, flow: DeviceFlow) -> Result<Vec<AudioDevice>, AudioError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(data_flow(flow), DEVICE_STATE_ACTIVE)
                .map_err(AudioError::EnumerationFailed)?;

            let count = collection
                .GetCount()
                .map_err(AudioError::EnumerationFailed)?;

            let mut devices = Vec::with_capacity(count as usize);
            for i in 0..count {
                let device = collection.Item(i).map_err(AudioError::EnumerationFailed)?;
                if let Ok(device) = self.to_audio_device(&device) {
                    devices.push(device);
                }
            }

            Ok(devices)
        }
    }

    /// The default device for a flow and role, if the OS has one.
    pub fn default_device(
        &self,
        flow: DeviceFlow,
        device_role: DeviceRole,
    ) -> Result<Option<AudioDevice>, AudioError> {
        unsafe {
            let device = match self
                .enumerator
                .GetDefaultAudioEndpoint(data_flow(flow), role(device_role))
            {
                Ok(d) => d,
                // No endpoint for this flow at all
                Err(_) => return Ok(None),
            };

            self.to_audio_device(&device).map(Some)
        }
    }

    /// Convert an IMMDevice to an AudioDevice (ID plus friendly name).
    fn to_audio_device(&self, device: &IMMDevice) -> Result<AudioDevice, AudioError> {
        unsafe {
            let id = device.GetId().map_err(AudioError::EnumerationFailed)?;
            let id_string = id
                .to_string()
                .map_err(|e| AudioError::StringConversion(e.to_string()))?;

            let props: IPropertyStore = device
                .OpenPropertyStore(STGM(0))
                .map_err(AudioError::EnumerationFailed)?;

            let name = friendly_name(&props).unwrap_or_else(|| "Unknown".to_string());

            Ok(AudioDevice::new(id_string, name))
        }
    }
}

/// Read the friendly name of a device from its property store.
fn friendly_name(props: &IPropertyStore) -> Option<String> {
    unsafe {
        // Convert DEVPROPKEY to PROPERTYKEY
        let key = PROPERTYKEY {
            fmtid: DEVPKEY_Device_FriendlyName.fmtid,
            pid: DEVPKEY_Device_FriendlyName.pid,
        };

        let prop = props.GetValue(&key).ok()?;
        let s = prop.to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}
