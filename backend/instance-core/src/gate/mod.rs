//! OS-wide "first instance" detection.
//!
//! [`InstanceGate`] wraps a named exclusivity primitive: a session-local named
//! mutex on Windows, an exclusively locked file in the runtime directory on
//! Unix. The gate fails open: an unexpected error while acquiring reports
//! "first instance" so that a fault here never blocks application startup.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use self::unix as platform;
#[cfg(windows)]
use self::windows as platform;

pub use platform::ExclusivityHandle;

use crate::config::InstanceConfig;

use log::{error, info, warn};
use serde::Serialize;

/// Classification of the most recent acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AcquireOutcome {
    /// This process created the primitive and owns it.
    CreatedNew,
    /// The primitive existed but its previous owner died without releasing it.
    ReclaimedAbandoned,
    /// Another live process owns the primitive.
    HeldElsewhere,
    /// Acquisition failed unexpectedly; treated as first instance.
    FailedOpen,
}

impl AcquireOutcome {
    pub fn is_first_instance(self) -> bool {
        !matches!(self, AcquireOutcome::HeldElsewhere)
    }
}

/// Result of a platform acquisition that did not fail.
pub(crate) enum Acquisition {
    Owned {
        handle: ExclusivityHandle,
        reclaimed: bool,
    },
    HeldElsewhere,
}

pub struct InstanceGate {
    config: InstanceConfig,
    handle: Option<ExclusivityHandle>,
    outcome: Option<AcquireOutcome>,
}

impl InstanceGate {
    pub fn new(config: &InstanceConfig) -> Self {
        Self {
            config: config.clone(),
            handle: None,
            outcome: None,
        }
    }

    /// Returns `true` when this process is (or must be treated as) the only
    /// instance, `false` only when another live process holds the primitive.
    ///
    /// Calling this again while the primitive is held returns `true` without
    /// touching the OS.
    pub fn try_acquire(&mut self) -> bool {
        if self.handle.is_some() {
            return true;
        }

        let outcome = match platform::acquire(&self.config) {
            Ok(Acquisition::Owned { handle, reclaimed }) => {
                self.handle = Some(handle);
                if reclaimed {
                    warn!(
                        "Reclaimed abandoned instance gate '{}' (previous owner exited without releasing)",
                        self.config.gate_name()
                    );
                    AcquireOutcome::ReclaimedAbandoned
                } else {
                    info!("Acquired instance gate '{}'", self.config.gate_name());
                    AcquireOutcome::CreatedNew
                }
            }
            Ok(Acquisition::HeldElsewhere) => {
                info!(
                    "Instance gate '{}' is held by another process",
                    self.config.gate_name()
                );
                AcquireOutcome::HeldElsewhere
            }
            Err(e) => {
                error!("Instance gate acquisition failed, continuing as first instance: {e}");
                AcquireOutcome::FailedOpen
            }
        };

        self.outcome = Some(outcome);
        outcome.is_first_instance()
    }

    /// Release the primitive. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle);
            info!("Released instance gate '{}'", self.config.gate_name());
        }
    }

    /// Whether this gate currently owns the primitive. `false` after a
    /// fail-open acquisition, since nothing is actually held.
    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }

    pub fn outcome(&self) -> Option<AcquireOutcome> {
        self.outcome
    }
}

impl Drop for InstanceGate {
    fn drop(&mut self) {
        self.release();
    }
}
