//! Audio device service: cached enumeration and default switching.
//!
//! Enumeration is comparatively expensive and happens on every settings-UI
//! open and every hotkey press, so active-device snapshots are cached per
//! flow for a few seconds. The "set default" call is dispatched to a worker
//! thread and not awaited: a `true` return means the request was accepted,
//! not that the OS finished the switch.

use super::device::{AudioDevice, AudioError, DeviceFlow, DeviceRole};
use super::enumerator::{ComGuard, DeviceEnumerator};
use super::policy::PolicyConfig;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a device snapshot stays valid.
const CACHE_TTL: Duration = Duration::from_secs(5);

struct Snapshot {
    devices: Vec<AudioDevice>,
    taken_at: Instant,
}

impl Snapshot {
    fn is_fresh(&self) -> bool {
        self.taken_at.elapsed() <= CACHE_TTL
    }
}

/// Enumerates active endpoints and sets the OS default endpoint.
///
/// Callers on any thread must hold a [`ComGuard`] while using the service.
pub struct AudioDeviceService {
    playback_cache: Mutex<Option<Snapshot>>,
    capture_cache: Mutex<Option<Snapshot>>,
}

impl AudioDeviceService {
    /// Create the service. Probes the MMDevice enumerator once so a broken
    /// audio subsystem fails fast at construction.
    pub fn new() -> Result<Self, AudioError> {
        DeviceEnumerator::new()?;
        Ok(Self {
            playback_cache: Mutex::new(None),
            capture_cache: Mutex::new(None),
        })
    }

    fn cache(&self, flow: DeviceFlow) -> &Mutex<Option<Snapshot>> {
        match flow {
            DeviceFlow::Playback => &self.playback_cache,
            DeviceFlow::Capture => &self.capture_cache,
        }
    }

    /// Active devices for a flow, from the cache when fresh.
    pub fn active_devices(&self, flow: DeviceFlow) -> Result<Vec<AudioDevice>, AudioError> {
        let mut cache = self.cache(flow).lock().unwrap_or_else(|e| e.into_inner());
        if let Some(snapshot) = cache.as_ref() {
            if snapshot.is_fresh() {
                return Ok(snapshot.devices.clone());
            }
        }

        let devices = DeviceEnumerator::new()?.active_devices(flow)?;
        *cache = Some(Snapshot {
            devices: devices.clone(),
            taken_at: Instant::now(),
        });
        Ok(devices)
    }

    /// Active device names for a flow, in OS enumeration order.
    pub fn device_names(&self, flow: DeviceFlow) -> Result<Vec<String>, AudioError> {
        Ok(self
            .active_devices(flow)?
            .into_iter()
            .map(|d| d.name)
            .collect())
    }

    /// The current default device for a flow (Console role). Not cached.
    pub fn default_device(&self, flow: DeviceFlow) -> Result<Option<AudioDevice>, AudioError> {
        DeviceEnumerator::new()?.default_device(flow, DeviceRole::Console)
    }

    /// Drop the cached snapshots; the next read re-enumerates.
    pub fn invalidate_cache(&self) {
        for flow in [DeviceFlow::Playback, DeviceFlow::Capture] {
            let mut cache = self.cache(flow).lock().unwrap_or_else(|e| e.into_inner());
            *cache = None;
        }
    }

    /// Find a device by case-insensitive name, refreshing the cache once if
    /// the name is not in the current snapshot.
    fn find_by_name(&self, flow: DeviceFlow, name: &str) -> Result<Option<AudioDevice>, AudioError> {
        let found = self
            .active_devices(flow)?
            .into_iter()
            .find(|d| d.name_matches(name));
        if found.is_some() {
            return Ok(found);
        }

        // Not in the snapshot; the device may have just been plugged in.
        self.invalidate_cache();
        Ok(self
            .active_devices(flow)?
            .into_iter()
            .find(|d| d.name_matches(name)))
    }

    /// Set the default device for a flow by name.
    ///
    /// Returns `true` once the switch request has been handed to the OS;
    /// the actual switch completes asynchronously and is not confirmed.
    /// Returns `false` when the device cannot be found or the platform call
    /// fails; never panics or propagates an error.
    pub fn set_default_device(&self, flow: DeviceFlow, name: &str) -> bool {
        match self.try_set_default_device(flow, name) {
            Ok(dispatched) => dispatched,
            Err(e) => {
                warn!(?flow, name, error = %e, "failed to set default device");
                false
            }
        }
    }

    fn try_set_default_device(&self, flow: DeviceFlow, name: &str) -> Result<bool, AudioError> {
        let device = match self.find_by_name(flow, name)? {
            Some(device) => device,
            None => {
                debug!(?flow, name, "device not found in active set");
                return Ok(false);
            }
        };

        let id = device.id;
        let device_name = device.name;
        std::thread::spawn(move || {
            let _com = match ComGuard::new() {
                Ok(guard) => guard,
                Err(e) => {
                    warn!(error = %e, "switch worker could not initialize COM");
                    return;
                }
            };
            match PolicyConfig::new()
                .and_then(|policy| policy.set_default_endpoint_all_roles(&id))
            {
                Ok(()) => debug!(name = %device_name, "default endpoint switched"),
                Err(e) => warn!(name = %device_name, error = %e, "default endpoint switch failed"),
            }
        });

        // Next enumeration should reflect the new default.
        self.invalidate_cache();

        Ok(true)
    }
}
