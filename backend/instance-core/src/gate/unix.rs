use crate::config::InstanceConfig;
use crate::error::gate::GateError;
use crate::gate::Acquisition;

use common::ErrorLocation;

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{Read, Seek, Write};

use log::{debug, warn};

const LOCK_EXTENSION: &str = "lock";

/// Exclusively locked lock file holding the owner's pid.
///
/// The file is never unlinked: a launch that already opened the path must
/// contend on the same inode as everyone else. A clean release empties the
/// file, so leftover content at acquire means the previous owner crashed.
pub struct ExclusivityHandle {
    file: File,
}

impl Drop for ExclusivityHandle {
    fn drop(&mut self) {
        // Emptied while still locked, so the next owner sees a clean release.
        if let Err(e) = self.file.set_len(0) {
            warn!("Failed to clear lock file: {e}");
        }
        if let Err(e) = self.file.unlock() {
            debug!("Failed to unlock lock file: {e}");
        }
    }
}

pub(crate) fn acquire(config: &InstanceConfig) -> Result<Acquisition, GateError> {
    let dir = config.runtime_dir();
    fs::create_dir_all(&dir)?;

    let path = config.runtime_path(config.gate_name(), LOCK_EXTENSION);

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
        .map_err(|e| GateError::Create {
            message: format!("Failed to open lock file {}: {e}", path.display()),
            location: ErrorLocation::caller(),
        })?;

    match file.try_lock() {
        Ok(()) => {}
        Err(TryLockError::WouldBlock) => return Ok(Acquisition::HeldElsewhere),
        Err(TryLockError::Error(e)) => {
            return Err(GateError::Lock {
                message: format!("Failed to lock {}: {e}", path.display()),
                location: ErrorLocation::caller(),
            });
        }
    }

    let mut previous = String::new();
    file.read_to_string(&mut previous)?;
    let reclaimed = !previous.trim().is_empty();
    if reclaimed {
        debug!(
            "Lock file {} still names pid {}",
            path.display(),
            previous.trim()
        );
    }

    file.set_len(0)?;
    file.rewind()?;
    write!(file, "{}", std::process::id())?;
    file.flush()?;
    debug!("Locked {} (pid {})", path.display(), std::process::id());

    Ok(Acquisition::Owned {
        handle: ExclusivityHandle { file },
        reclaimed,
    })
}
