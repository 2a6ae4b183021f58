use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum GateError {
    #[error("Create Error: {message} {location}")]
    Create {
        message: String,
        location: ErrorLocation,
    },

    #[error("Lock Error: {message} {location}")]
    Lock {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for GateError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        GateError::Io {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
