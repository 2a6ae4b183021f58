//! Dual-output logging for the Searchlight process.
//!
//! Coloured lines on stdout plus a plain-text `searchlight.log` in the log
//! directory. Both instances of a double launch log to the same file, so
//! every line carries the pid.

use crate::error::SearchlightError;

use common::ErrorLocation;

use std::fs::{File, create_dir_all};
use std::io::stdout;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

/// Thread-safe initialization guard.
static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "searchlight.log";

const LOGGER_INITIALIZED_MESSAGE_PREFIX: &str = "Logger initialized with level: ";
const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

/// Initialize the logger with dual output (stdout + file).
///
/// Safe to call multiple times: later calls log a warning and return `Ok`.
/// Creates `log_dir` if it does not exist.
///
/// # Errors
///
/// Returns [`SearchlightError::Logger`] if:
/// - The log directory or log file cannot be created
/// - A global logger was already installed by someone else
pub fn initialize(log_dir: &Path, level: LevelFilter) -> Result<(), SearchlightError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir, level);
        if result.is_ok() {
            info!("{LOGGER_INITIALIZED_MESSAGE_PREFIX}{level:?}");
        }
    });

    result
}

/// Create the log directory if needed and open the log file for appending.
#[track_caller]
pub(crate) fn open_log_file(log_dir: &Path) -> Result<File, SearchlightError> {
    create_dir_all(log_dir).map_err(|e| SearchlightError::Logger {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::caller(),
    })?;

    fern::log_file(log_dir.join(LOG_FILE_NAME)).map_err(|e| SearchlightError::Logger {
        message: format!("Failed to create log file: {e}"),
        location: ErrorLocation::caller(),
    })
}

#[track_caller]
fn initialize_internal(log_dir: &Path, level: LevelFilter) -> Result<(), SearchlightError> {
    let log_file = open_log_file(log_dir)?;
    let pid = std::process::id();

    let color_configuration = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let base_dispatch = Dispatch::new().level(level);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level} - {pid}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = color_configuration.color(record.level()),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level} - {pid}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0)
            ))
        })
        .chain(log_file);

    base_dispatch
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| SearchlightError::Logger {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::caller(),
        })?;

    Ok(())
}
