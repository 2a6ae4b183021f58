use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum WindowError {
    /// An OS or toolkit call reported failure.
    #[error("Call Error: {call} failed (os error {code}) {location}")]
    Call {
        call: &'static str,
        code: i32,
        location: ErrorLocation,
    },

    #[error("Toolkit Error: {message} {location}")]
    Toolkit {
        message: String,
        location: ErrorLocation,
    },
}

impl WindowError {
    #[track_caller]
    pub fn call(call: &'static str, code: i32) -> Self {
        WindowError::Call {
            call,
            code,
            location: ErrorLocation::caller(),
        }
    }

    /// Build a [`WindowError::Call`] from the calling thread's last OS error.
    #[track_caller]
    pub fn last_os_error(call: &'static str) -> Self {
        let code = std::io::Error::last_os_error().raw_os_error().unwrap_or_default();
        Self::call(call, code)
    }
}
