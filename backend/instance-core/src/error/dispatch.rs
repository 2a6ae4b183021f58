use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DispatchError {
    /// The UI side dropped its receiver or its thread has exited.
    #[error("Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Post Error: {message} {location}")]
    Post {
        message: String,
        location: ErrorLocation,
    },
}
