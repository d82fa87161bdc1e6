//! Process-wide single-instance guard.
//!
//! A named Win32 mutex held for the process lifetime. A second instance
//! sees the name already taken and exits before registering any hotkeys.

use windows::core::{w, Error};
use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, HANDLE};
use windows::Win32::System::Threading::CreateMutexW;

/// Holds the named mutex; dropping it releases the instance slot.
pub struct SingleInstanceGuard {
    handle: HANDLE,
}

// The handle is only closed on drop; the mutex itself is a kernel object.
unsafe impl Send for SingleInstanceGuard {}

impl SingleInstanceGuard {
    /// Try to become the single running instance.
    ///
    /// Returns `Ok(None)` when another instance already holds the mutex.
    pub fn acquire() -> Result<Option<Self>, Error> {
        unsafe {
            let handle = CreateMutexW(None, true, w!("AudioToggleSingleInstance"))?;

            if Error::from_win32().code() == ERROR_ALREADY_EXISTS.to_hresult() {
                let _ = CloseHandle(handle);
                return Ok(None);
            }

            Ok(Some(Self { handle }))
        }
    }
}

impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}
