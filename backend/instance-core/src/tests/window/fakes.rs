//! Recording stand-ins for the OS window manager and the toolkit window.

use crate::error::window::WindowError;
use crate::window::{ActivationTarget, FlashFlags, ShowCommand, WindowHandleRef, WindowSystem};

use std::cell::{Cell, RefCell};

pub const UI_THREAD: u32 = 100;
pub const OTHER_THREAD: u32 = 200;
pub const MAIN_WINDOW: WindowHandleRef = WindowHandleRef(0x1000);
pub const OTHER_WINDOW: WindowHandleRef = WindowHandleRef(0x2000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCall {
    ShowWindow(ShowCommand),
    Attach { from: u32, to: u32 },
    Detach { from: u32, to: u32 },
    BringToTop,
    SetForeground,
    SetActive,
    SetFocus,
    Flash { flags: FlashFlags, count: u32 },
}

/// Fake window manager. `SetForegroundWindow` succeeds only when
/// `grants_foreground` is set, mirroring the OS foreground lock.
pub struct FakeWindowSystem {
    pub calls: RefCell<Vec<SystemCall>>,
    pub foreground: Cell<Option<WindowHandleRef>>,
    pub iconic: Cell<bool>,
    pub grants_foreground: bool,
    pub fail_foreground_calls: bool,
    pub fail_attach: bool,
}

impl FakeWindowSystem {
    /// Another process's window is in front and the OS refuses to hand it over.
    pub fn foreground_locked() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            foreground: Cell::new(Some(OTHER_WINDOW)),
            iconic: Cell::new(false),
            grants_foreground: false,
            fail_foreground_calls: false,
            fail_attach: false,
        }
    }

    /// Another process's window is in front but the OS lets us take over.
    pub fn foreground_granted() -> Self {
        Self {
            grants_foreground: true,
            ..Self::foreground_locked()
        }
    }

    pub fn recorded(&self) -> Vec<SystemCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, predicate: impl Fn(&SystemCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    pub fn position(&self, call: &SystemCall) -> Option<usize> {
        self.calls.borrow().iter().position(|c| c == call)
    }

    fn record(&self, call: SystemCall) {
        self.calls.borrow_mut().push(call);
    }

    fn foreground_call(&self, call: SystemCall, name: &'static str) -> Result<(), WindowError> {
        self.record(call);
        if self.fail_foreground_calls {
            return Err(WindowError::call(name, 5));
        }
        Ok(())
    }
}

impl WindowSystem for FakeWindowSystem {
    fn is_iconic(&self, _window: WindowHandleRef) -> bool {
        self.iconic.get()
    }

    fn show_window(&self, _window: WindowHandleRef, command: ShowCommand) {
        if command == ShowCommand::Restore {
            self.iconic.set(false);
        }
        self.record(SystemCall::ShowWindow(command));
    }

    fn foreground_window(&self) -> Option<WindowHandleRef> {
        self.foreground.get()
    }

    fn window_thread_id(&self, window: WindowHandleRef) -> Option<u32> {
        match window {
            MAIN_WINDOW => Some(UI_THREAD),
            OTHER_WINDOW => Some(OTHER_THREAD),
            _ => None,
        }
    }

    fn current_thread_id(&self) -> u32 {
        UI_THREAD
    }

    fn attach_thread_input(&self, from: u32, to: u32, attach: bool) -> Result<(), WindowError> {
        if attach {
            self.record(SystemCall::Attach { from, to });
            if self.fail_attach {
                return Err(WindowError::call("AttachThreadInput", 87));
            }
        } else {
            self.record(SystemCall::Detach { from, to });
        }
        Ok(())
    }

    fn bring_window_to_top(&self, _window: WindowHandleRef) -> Result<(), WindowError> {
        self.foreground_call(SystemCall::BringToTop, "BringWindowToTop")
    }

    fn set_foreground_window(&self, window: WindowHandleRef) -> Result<(), WindowError> {
        self.foreground_call(SystemCall::SetForeground, "SetForegroundWindow")?;
        if self.grants_foreground {
            self.foreground.set(Some(window));
            Ok(())
        } else {
            Err(WindowError::call("SetForegroundWindow", 0))
        }
    }

    fn set_active_window(&self, _window: WindowHandleRef) -> Result<(), WindowError> {
        self.foreground_call(SystemCall::SetActive, "SetActiveWindow")
    }

    fn set_focus(&self, _window: WindowHandleRef) -> Result<(), WindowError> {
        self.foreground_call(SystemCall::SetFocus, "SetFocus")
    }

    fn flash_window(
        &self,
        _window: WindowHandleRef,
        flags: FlashFlags,
        count: u32,
    ) -> Result<(), WindowError> {
        self.record(SystemCall::Flash { flags, count });
        Ok(())
    }
}

/// Fake toolkit window with the state the activation sequence touches.
pub struct FakeTarget {
    pub handle: Cell<Option<WindowHandleRef>>,
    pub handle_after_ensure: Option<WindowHandleRef>,
    pub ensure_calls: Cell<u32>,
    pub minimized: Cell<bool>,
    pub visible: Cell<bool>,
    pub show_in_taskbar: Cell<bool>,
    pub activated: Cell<bool>,
    pub focused: Cell<bool>,
    pub fail_toolkit_calls: bool,
}

impl FakeTarget {
    pub fn with_handle() -> Self {
        Self {
            handle: Cell::new(Some(MAIN_WINDOW)),
            handle_after_ensure: Some(MAIN_WINDOW),
            ensure_calls: Cell::new(0),
            minimized: Cell::new(false),
            visible: Cell::new(true),
            show_in_taskbar: Cell::new(true),
            activated: Cell::new(false),
            focused: Cell::new(false),
            fail_toolkit_calls: false,
        }
    }

    /// Minimized to the tray: hidden and absent from the taskbar.
    pub fn minimized_to_tray() -> Self {
        let target = Self::with_handle();
        target.minimized.set(true);
        target.visible.set(false);
        target.show_in_taskbar.set(false);
        target
    }

    fn toolkit_result(&self, what: &str) -> Result<(), WindowError> {
        if self.fail_toolkit_calls {
            return Err(WindowError::Toolkit {
                message: format!("{what} failed"),
                location: common::ErrorLocation::caller(),
            });
        }
        Ok(())
    }
}

impl ActivationTarget for FakeTarget {
    fn native_handle(&self) -> Option<WindowHandleRef> {
        self.handle.get()
    }

    fn ensure_handle(&self) -> Result<(), WindowError> {
        self.ensure_calls.set(self.ensure_calls.get() + 1);
        self.handle.set(self.handle_after_ensure);
        Ok(())
    }

    fn is_minimized(&self) -> bool {
        self.minimized.get()
    }

    // State changes apply even when the call reports failure, the way a
    // toolkit can apply a property and then fail a follow-up notification.
    fn set_normal_state(&self) -> Result<(), WindowError> {
        self.minimized.set(false);
        self.toolkit_result("set_normal_state")
    }

    fn set_visible(&self, visible: bool) -> Result<(), WindowError> {
        self.visible.set(visible);
        self.toolkit_result("set_visible")
    }

    fn set_show_in_taskbar(&self, show: bool) -> Result<(), WindowError> {
        self.show_in_taskbar.set(show);
        self.toolkit_result("set_show_in_taskbar")
    }

    fn activate(&self) -> Result<(), WindowError> {
        self.activated.set(true);
        self.toolkit_result("activate")
    }

    fn focus(&self) -> Result<(), WindowError> {
        self.focused.set(true);
        self.toolkit_result("focus")
    }
}
