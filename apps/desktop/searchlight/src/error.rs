use common::ErrorLocation;

use serde::Serialize;
use thiserror::Error;

/// Errors that stop the application from starting or running.
///
/// Nothing in the single-instance path produces these; that path logs and
/// carries on. They cover the process plumbing around it.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum SearchlightError {
    /// Logger setup failed (log directory, log file, global logger)
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// The async runtime could not be built
    #[error("Runtime Error: {message} {location}")]
    Runtime {
        message: String,
        location: ErrorLocation,
    },

    /// The UI shell failed to create its window or run its loop
    #[error("Shell Error: {message} {location}")]
    Shell {
        message: String,
        location: ErrorLocation,
    },
}
