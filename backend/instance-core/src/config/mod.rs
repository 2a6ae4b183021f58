//! Names and timings for the single-instance subsystem.
//!
//! There is no user-facing configuration: the defaults are fixed per build
//! flavour. The `with_*` builders exist so tests can isolate names and shrink
//! timings without touching the running application.

use crate::APP_DISPLAY_NAME;
use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::path::{Path, PathBuf};
use std::time::Duration;

use const_format::concatcp;
use serde::Serialize;

#[cfg(debug_assertions)]
const BUILD_SUFFIX: &str = "_Debug";

#[cfg(not(debug_assertions))]
const BUILD_SUFFIX: &str = "";

const GATE_SUFFIX: &str = "_SingleInstance";
const CHANNEL_SUFFIX: &str = "_Activation";

pub const DEFAULT_GATE_NAME: &str = concatcp!(APP_DISPLAY_NAME, GATE_SUFFIX, BUILD_SUFFIX);
pub const DEFAULT_CHANNEL_NAME: &str = concatcp!(APP_DISPLAY_NAME, CHANNEL_SUFFIX, BUILD_SUFFIX);

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const READ_TIMEOUT: Duration = Duration::from_secs(2);
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(3);
pub const IO_FAULT_BACKOFF: Duration = Duration::from_millis(2000);
pub const OTHER_FAULT_BACKOFF: Duration = Duration::from_millis(1000);
pub const READ_BUFFER_SIZE: usize = 256;

/// Longest name accepted. Unix socket paths are capped near 108 bytes, and the
/// runtime directory prefix eats part of that.
const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceConfig {
    gate_name: String,
    channel_name: String,
    runtime_dir: Option<PathBuf>,
    connect_timeout: Duration,
    read_timeout: Duration,
    cleanup_timeout: Duration,
    io_fault_backoff: Duration,
    other_fault_backoff: Duration,
    read_buffer_size: usize,
}

impl InstanceConfig {
    /// Derive gate and channel names from an application id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the id is empty, too long, or
    /// contains characters that are not valid in a pipe or file name.
    #[track_caller]
    pub fn for_app(app_id: &str) -> Result<Self, ConfigError> {
        validate_name("app id", app_id)?;

        let config = Self {
            gate_name: format!("{app_id}{GATE_SUFFIX}"),
            channel_name: format!("{app_id}{CHANNEL_SUFFIX}"),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_name("gate", &self.gate_name)?;
        validate_name("channel", &self.channel_name)?;

        if self.gate_name == self.channel_name {
            return Err(ConfigError::Validation {
                message: format!(
                    "gate and channel must use distinct names, both are '{}'",
                    self.gate_name
                ),
                location: ErrorLocation::caller(),
            });
        }

        if self.read_buffer_size == 0 {
            return Err(ConfigError::Validation {
                message: "read buffer size must be non-zero".to_string(),
                location: ErrorLocation::caller(),
            });
        }

        Ok(())
    }

    pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = Some(dir.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.cleanup_timeout = timeout;
        self
    }

    pub fn with_fault_backoff(mut self, io_fault: Duration, other_fault: Duration) -> Self {
        self.io_fault_backoff = io_fault;
        self.other_fault_backoff = other_fault;
        self
    }

    pub fn gate_name(&self) -> &str {
        &self.gate_name
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Directory holding the Unix lock file and socket.
    ///
    /// Defaults to the user runtime directory, then the temp directory.
    /// Ignored on Windows, where both primitives live in the session namespace.
    pub fn runtime_dir(&self) -> PathBuf {
        self.runtime_dir
            .clone()
            .or_else(dirs::runtime_dir)
            .unwrap_or_else(std::env::temp_dir)
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn cleanup_timeout(&self) -> Duration {
        self.cleanup_timeout
    }

    pub fn io_fault_backoff(&self) -> Duration {
        self.io_fault_backoff
    }

    pub fn other_fault_backoff(&self) -> Duration {
        self.other_fault_backoff
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub(crate) fn runtime_path(&self, name: &str, extension: &str) -> PathBuf {
        runtime_path_in(&self.runtime_dir(), name, extension)
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            gate_name: DEFAULT_GATE_NAME.to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            runtime_dir: None,
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            cleanup_timeout: CLEANUP_TIMEOUT,
            io_fault_backoff: IO_FAULT_BACKOFF,
            other_fault_backoff: OTHER_FAULT_BACKOFF,
            read_buffer_size: READ_BUFFER_SIZE,
        }
    }
}

fn runtime_path_in(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{extension}", name.to_ascii_lowercase()))
}

#[track_caller]
fn validate_name(kind: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(ConfigError::Validation {
            message: format!("{kind} name must be 1..={MAX_NAME_LEN} characters, got {}", name.len()),
            location: ErrorLocation::caller(),
        });
    }

    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !valid {
        return Err(ConfigError::Validation {
            message: format!("{kind} name '{name}' contains characters outside [A-Za-z0-9_.-]"),
            location: ErrorLocation::caller(),
        });
    }

    Ok(())
}
