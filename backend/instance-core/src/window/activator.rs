use crate::error::window::WindowError;
use crate::window::guard::ThreadInputGuard;
use crate::window::system::{ActivationTarget, WindowSystem};
use crate::window::types::{FlashFlags, ShowCommand, WindowHandleRef};

use log::{debug, info, warn};
use serde::Serialize;

/// Taskbar flashes issued when the OS refuses foreground.
pub const FLASH_COUNT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivationOutcome {
    /// The window ended up as the foreground window.
    Foreground,
    /// Foreground was refused; the taskbar button was flashed instead.
    Flashed,
    /// No native handle could be obtained; nothing was done.
    NoHandle,
}

pub struct WindowActivator<S: WindowSystem> {
    system: S,
}

impl<S: WindowSystem> WindowActivator<S> {
    pub fn new(system: S) -> Self {
        Self { system }
    }

    #[cfg(test)]
    pub(crate) fn system(&self) -> &S {
        &self.system
    }

    /// Run the full escalation against `target`. Call on the UI thread.
    ///
    /// Every step is attempted even if an earlier one failed. Failures are
    /// logged and never propagate.
    pub fn activate(&self, target: &dyn ActivationTarget) -> ActivationOutcome {
        let Some(window) = self.resolve_handle(target) else {
            warn!("Main window has no native handle, skipping activation");
            return ActivationOutcome::NoHandle;
        };

        self.restore(target, window);
        self.ensure_visible(target, window);
        self.force_foreground(window);

        log_failure("activate window", target.activate());
        log_failure("focus window", target.focus());

        if self.system.foreground_window() == Some(window) {
            info!("Main window activated");
            return ActivationOutcome::Foreground;
        }

        debug!("Foreground refused, flashing taskbar button");
        log_failure(
            "flash window",
            self.system.flash_window(
                window,
                FlashFlags::ALL | FlashFlags::TIMER_NO_FOREGROUND,
                FLASH_COUNT,
            ),
        );
        ActivationOutcome::Flashed
    }

    fn resolve_handle(&self, target: &dyn ActivationTarget) -> Option<WindowHandleRef> {
        if let Some(window) = target.native_handle() {
            return Some(window);
        }

        debug!("Main window handle not created yet, forcing creation");
        log_failure("create window handle", target.ensure_handle());
        target.native_handle()
    }

    fn restore(&self, target: &dyn ActivationTarget, window: WindowHandleRef) {
        if target.is_minimized() || self.system.is_iconic(window) {
            log_failure("restore window state", target.set_normal_state());
            self.system.show_window(window, ShowCommand::Restore);
        }
    }

    fn ensure_visible(&self, target: &dyn ActivationTarget, window: WindowHandleRef) {
        log_failure("show window", target.set_visible(true));
        log_failure("show in taskbar", target.set_show_in_taskbar(true));
        self.system.show_window(window, ShowCommand::ShowNormal);
    }

    fn force_foreground(&self, window: WindowHandleRef) {
        let current = self.system.current_thread_id();
        let foreground_thread = self
            .system
            .foreground_window()
            .and_then(|fg| self.system.window_thread_id(fg));

        let _guard = match foreground_thread {
            Some(thread) if thread != current => {
                Some(ThreadInputGuard::attach(&self.system, current, thread))
            }
            _ => None,
        };

        log_failure("bring window to top", self.system.bring_window_to_top(window));
        log_failure("set foreground window", self.system.set_foreground_window(window));
        log_failure("set active window", self.system.set_active_window(window));
        log_failure("set focus", self.system.set_focus(window));
    }
}

fn log_failure(step: &str, result: Result<(), WindowError>) {
    if let Err(e) = result {
        warn!("Failed to {step}: {e}");
    }
}
