//! The UI side of the primary instance.
//!
//! A [`Shell`] owns the UI thread: it starts the activation server with a
//! dispatcher that targets itself, then runs until the user quits. It returns
//! with the server still running; the caller cleans it up.

mod headless;
#[cfg(windows)]
mod win32;

// windows-sys only exports the `*WindowLongPtrW` pair on 64-bit targets.
#[cfg(all(windows, not(target_pointer_width = "64")))]
compile_error!("the Windows shell requires a 64-bit target");

pub use headless::HeadlessShell;
#[cfg(windows)]
pub use win32::{MainWindow, WM_SEARCHLIGHT_ACTIVATE, Win32Shell};
#[cfg(all(windows, test))]
pub(crate) use win32::taskbar_ex_style;

use crate::error::SearchlightError;

use instance_core::ipc::ActivationServer;

use tokio::runtime::Runtime;

pub trait Shell {
    /// Start `server` and run the UI loop on the calling thread until exit.
    fn run(self, runtime: &Runtime, server: &mut ActivationServer) -> Result<(), SearchlightError>;
}

/// The shell for the current platform: a native window on Windows, a
/// console loop that exits on Ctrl-C elsewhere.
#[cfg(windows)]
pub fn platform_shell() -> Win32Shell {
    Win32Shell::new()
}

#[cfg(not(windows))]
pub fn platform_shell() -> HeadlessShell {
    HeadlessShell::until_ctrl_c()
}
