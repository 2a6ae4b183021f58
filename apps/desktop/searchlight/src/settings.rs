//! Process settings read from the environment.
//!
//! An optional `.env` is loaded first, from the working directory or else
//! next to the executable. Real environment variables take precedence over it.

use instance_core::APP_DISPLAY_NAME;

use std::env;
use std::path::PathBuf;

use log::{LevelFilter, info, warn};

pub const LOG_LEVEL_VAR: &str = "SEARCHLIGHT_LOG";
pub const LOG_DIR_VAR: &str = "SEARCHLIGHT_LOG_DIR";

const LOGS_SUBDIR: &str = "logs";

#[cfg(debug_assertions)]
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    log_level: LevelFilter,
    log_dir: PathBuf,
    env_file: Option<PathBuf>,
    rejected_level: Option<String>,
}

impl Settings {
    /// Load `.env` (if any) and read settings from the process environment.
    pub fn load() -> Self {
        let env_file = load_env_file();
        let mut settings = Self::from_lookup(|key| env::var(key).ok());
        settings.env_file = env_file;
        settings
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let (log_level, rejected_level) = match lookup(LOG_LEVEL_VAR) {
            Some(raw) => match raw.trim().parse::<LevelFilter>() {
                Ok(level) => (level, None),
                Err(_) => (DEFAULT_LOG_LEVEL, Some(raw)),
            },
            None => (DEFAULT_LOG_LEVEL, None),
        };

        let log_dir = lookup(LOG_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        Self {
            log_level,
            log_dir,
            env_file: None,
            rejected_level,
        }
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn log_dir(&self) -> &PathBuf {
        &self.log_dir
    }

    /// Log where settings came from. Call once the logger is up.
    pub fn report(&self) {
        if let Some(path) = &self.env_file {
            info!("Loaded environment from {}", path.display());
        }
        if let Some(raw) = &self.rejected_level {
            warn!(
                "Ignoring {LOG_LEVEL_VAR}='{raw}', expected one of off|error|warn|info|debug|trace"
            );
        }
        info!("Log directory: {}", self.log_dir.display());
    }
}

fn load_env_file() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let env_path = exe_dir.join(".env");
    if !env_path.exists() {
        return None;
    }
    dotenvy::from_path(&env_path).ok().map(|()| env_path)
}

/// `<local data dir>/Searchlight/logs`, or the same under the temp dir.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DISPLAY_NAME)
        .join(LOGS_SUBDIR)
}
