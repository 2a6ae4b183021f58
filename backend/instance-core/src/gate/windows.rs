use crate::config::InstanceConfig;
use crate::error::gate::GateError;
use crate::gate::Acquisition;

use common::ErrorLocation;

use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE, WAIT_ABANDONED, WAIT_OBJECT_0,
    WAIT_TIMEOUT,
};
use windows_sys::Win32::System::Threading::{CreateMutexW, ReleaseMutex, WaitForSingleObject};

const SESSION_NAMESPACE: &str = "Local\\";

/// Owned named mutex. Ownership is thread-affine, so release happens on the
/// thread that acquired it (the startup thread).
pub struct ExclusivityHandle {
    handle: HANDLE,
}

// The raw handle is only released in Drop; moving it between threads is fine.
unsafe impl Send for ExclusivityHandle {}

impl Drop for ExclusivityHandle {
    fn drop(&mut self) {
        unsafe {
            ReleaseMutex(self.handle);
            CloseHandle(self.handle);
        }
    }
}

pub(crate) fn acquire(config: &InstanceConfig) -> Result<Acquisition, GateError> {
    let name = to_wide(&format!("{SESSION_NAMESPACE}{}", config.gate_name()));
    let handle = unsafe { CreateMutexW(std::ptr::null(), 1, name.as_ptr()) };
    if handle.is_null() {
        let code = unsafe { GetLastError() };
        return Err(GateError::Create {
            message: format!("CreateMutexW failed with error {code}"),
            location: ErrorLocation::caller(),
        });
    }

    if unsafe { GetLastError() } != ERROR_ALREADY_EXISTS {
        return Ok(Acquisition::Owned {
            handle: ExclusivityHandle { handle },
            reclaimed: false,
        });
    }

    // The initial-owner request is ignored for an existing mutex; probe it.
    match unsafe { WaitForSingleObject(handle, 0) } {
        WAIT_ABANDONED => Ok(Acquisition::Owned {
            handle: ExclusivityHandle { handle },
            reclaimed: true,
        }),
        WAIT_OBJECT_0 => Ok(Acquisition::Owned {
            handle: ExclusivityHandle { handle },
            reclaimed: false,
        }),
        WAIT_TIMEOUT => {
            unsafe { CloseHandle(handle) };
            Ok(Acquisition::HeldElsewhere)
        }
        other => {
            let code = unsafe { GetLastError() };
            unsafe { CloseHandle(handle) };
            Err(GateError::Lock {
                message: format!("WaitForSingleObject returned {other} (error {code})"),
                location: ErrorLocation::caller(),
            })
        }
    }
}

fn to_wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}
