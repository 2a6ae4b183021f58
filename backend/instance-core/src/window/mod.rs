//! Bringing the existing main window to the foreground.
//!
//! Windows refuses `SetForegroundWindow` from a process that does not own the
//! current foreground window. [`WindowActivator`] runs the usual escalation:
//! restore, show, attach to the foreground thread's input queue, raise and
//! focus, then flash the taskbar button if the OS still said no.
//!
//! The sequence is written against two seams so it can run without a desktop:
//! [`WindowSystem`] for OS calls and [`ActivationTarget`] for the toolkit's
//! window object.

mod activator;
mod guard;
mod system;
mod types;

#[cfg(windows)]
mod win32;

pub use activator::{ActivationOutcome, FLASH_COUNT, WindowActivator};
pub use guard::ThreadInputGuard;
pub use system::{ActivationTarget, WindowSystem};
pub use types::{FlashFlags, ShowCommand, WindowHandleRef};

#[cfg(windows)]
pub use win32::Win32WindowSystem;
