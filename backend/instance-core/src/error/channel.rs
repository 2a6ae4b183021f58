use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ChannelError {
    #[error("Bind Error: {message} {location}")]
    Bind {
        message: String,
        location: ErrorLocation,
    },

    #[error("Accept Error: {message} {location}")]
    Accept {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("Write Error: {message} {location}")]
    Write {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for ChannelError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        if error.kind() == ErrorKind::TimedOut {
            return ChannelError::Timeout {
                message: error.to_string(),
                location: ErrorLocation::caller(),
            };
        }

        ChannelError::Io {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
