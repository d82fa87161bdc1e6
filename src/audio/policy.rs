//! Default-endpoint switching via the IPolicyConfig COM interface.
//!
//! IPolicyConfig is undocumented but stable; it is the only way to change
//! the system default endpoint programmatically.

use super::device::{AudioError, DeviceRole};
use windows::core::{interface, IUnknown, GUID, HRESULT, PCWSTR};
use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_ALL};

#[interface("F8679F50-850A-41CF-9C72-430F290290C8")]
unsafe trait IPolicyConfig: IUnknown {
    // Reserved methods to maintain vtable order
    fn reserved1(&self) -> HRESULT;
    fn reserved2(&self) -> HRESULT;
    fn reserved3(&self) -> HRESULT;
    fn reserved4(&self) -> HRESULT;
    fn reserved5(&self) -> HRESULT;
    fn reserved6(&self) -> HRESULT;
    fn reserved7(&self) -> HRESULT;
    fn reserved8(&self) -> HRESULT;
    fn reserved9(&self) -> HRESULT;
    fn reserved10(&self) -> HRESULT;

    fn SetDefaultEndpoint(&self, device_id: PCWSTR, role: u32) -> HRESULT;
}

const CLSID_POLICY_CONFIG_CLIENT: GUID = GUID::from_u128(0x870af99c_171d_4f9e_af0d_e63df40c2bc9);

/// Wrapper around the PolicyConfig COM object.
pub struct PolicyConfig {
    inner: IPolicyConfig,
}

impl PolicyConfig {
    /// Create the PolicyConfig client. COM must be initialized on the
    /// current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            let inner: IPolicyConfig = CoCreateInstance(&CLSID_POLICY_CONFIG_CLIENT, None, CLSCTX_ALL)
                .map_err(AudioError::SetDefaultFailed)?;
            Ok(Self { inner })
        }
    }

    /// Set the endpoint as the default for one role.
    pub fn set_default_endpoint(
        &self,
        device_id: &str,
        role: DeviceRole,
    ) -> Result<(), AudioError> {
        unsafe {
            let device_id_wide: Vec<u16> =
                device_id.encode_utf16().chain(std::iter::once(0)).collect();
            self.inner
                .SetDefaultEndpoint(PCWSTR(device_id_wide.as_ptr()), role as u32)
                .ok()
                .map_err(AudioError::SetDefaultFailed)
        }
    }

    /// Set the endpoint as the default for both the Console and
    /// Communications roles, the combination applications actually observe.
    pub fn set_default_endpoint_all_roles(&self, device_id: &str) -> Result<(), AudioError> {
        self.set_default_endpoint(device_id, DeviceRole::Console)?;
        self.set_default_endpoint(device_id, DeviceRole::Communications)?;
        Ok(())
    }
}
