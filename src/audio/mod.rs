//! Audio endpoint access.
//!
//! Enumeration and default-device switching over the Windows Core Audio
//! MMDevice API. The data types are portable; everything COM-facing is
//! Windows only.

pub mod device;
#[cfg(windows)]
pub mod enumerator;
#[cfg(windows)]
pub mod policy;
#[cfg(windows)]
pub mod service;

pub use device::{AudioDevice, DeviceFlow, DeviceRole};
#[cfg(windows)]
pub use device::AudioError;
#[cfg(windows)]
pub use enumerator::{ComGuard, DeviceEnumerator};
#[cfg(windows)]
pub use service::AudioDeviceService;
