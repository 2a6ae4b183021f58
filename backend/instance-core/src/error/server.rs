use crate::error::channel::ChannelError;

use common::ErrorLocation;

use thiserror::Error as ThisError;

/// How long the accept loop should wait before retrying after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Transport failure: broken pipe, endpoint in use, read timeout.
    Io,
    /// Anything else: permissions, invalid names, unexpected task failures.
    Other,
}

#[derive(Debug, ThisError)]
pub enum ServerError {
    #[error(transparent)]
    Transport(#[from] ChannelError),

    #[error("Fault Error: {message} {location}")]
    Fault {
        message: String,
        location: ErrorLocation,
    },
}

impl ServerError {
    pub fn class(&self) -> FaultClass {
        match self {
            ServerError::Transport(_) => FaultClass::Io,
            ServerError::Fault { .. } => FaultClass::Other,
        }
    }
}
