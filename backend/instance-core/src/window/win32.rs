//! [`WindowSystem`] over the Win32 window manager.

use crate::error::window::WindowError;
use crate::window::system::WindowSystem;
use crate::window::types::{FlashFlags, ShowCommand, WindowHandleRef};

use std::ffi::c_void;

use windows_sys::Win32::Foundation::{GetLastError, HWND, SetLastError};
use windows_sys::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{SetActiveWindow, SetFocus};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, FLASHWINFO, FlashWindowEx, GetForegroundWindow, GetWindowThreadProcessId,
    IsIconic, SW_RESTORE, SW_SHOWNORMAL, SetForegroundWindow, ShowWindow,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32WindowSystem;

fn hwnd(window: WindowHandleRef) -> HWND {
    window.0 as *mut c_void
}

/// Map a `BOOL` result to `Result`, reading the last error on failure.
#[track_caller]
fn check(call: &'static str, ok: i32) -> Result<(), WindowError> {
    if ok != 0 {
        Ok(())
    } else {
        Err(WindowError::call(call, unsafe { GetLastError() } as i32))
    }
}

/// For calls returning the previous window, where null is also a valid result.
#[track_caller]
fn check_previous(call: &'static str, f: impl FnOnce() -> HWND) -> Result<(), WindowError> {
    unsafe { SetLastError(0) };
    let previous = f();
    if !previous.is_null() {
        return Ok(());
    }
    match unsafe { GetLastError() } {
        0 => Ok(()),
        code => Err(WindowError::call(call, code as i32)),
    }
}

impl WindowSystem for Win32WindowSystem {
    fn is_iconic(&self, window: WindowHandleRef) -> bool {
        unsafe { IsIconic(hwnd(window)) != 0 }
    }

    fn show_window(&self, window: WindowHandleRef, command: ShowCommand) {
        let command = match command {
            ShowCommand::Restore => SW_RESTORE,
            ShowCommand::ShowNormal => SW_SHOWNORMAL,
        };
        // Return value is the previous visibility, not a status.
        unsafe { ShowWindow(hwnd(window), command) };
    }

    fn foreground_window(&self) -> Option<WindowHandleRef> {
        let fg = unsafe { GetForegroundWindow() };
        (!fg.is_null()).then(|| WindowHandleRef(fg as isize))
    }

    fn window_thread_id(&self, window: WindowHandleRef) -> Option<u32> {
        let thread = unsafe { GetWindowThreadProcessId(hwnd(window), std::ptr::null_mut()) };
        (thread != 0).then_some(thread)
    }

    fn current_thread_id(&self) -> u32 {
        unsafe { GetCurrentThreadId() }
    }

    fn attach_thread_input(&self, from: u32, to: u32, attach: bool) -> Result<(), WindowError> {
        check("AttachThreadInput", unsafe {
            AttachThreadInput(from, to, attach as i32)
        })
    }

    fn bring_window_to_top(&self, window: WindowHandleRef) -> Result<(), WindowError> {
        check("BringWindowToTop", unsafe { BringWindowToTop(hwnd(window)) })
    }

    fn set_foreground_window(&self, window: WindowHandleRef) -> Result<(), WindowError> {
        check("SetForegroundWindow", unsafe {
            SetForegroundWindow(hwnd(window))
        })
    }

    fn set_active_window(&self, window: WindowHandleRef) -> Result<(), WindowError> {
        check_previous("SetActiveWindow", || unsafe { SetActiveWindow(hwnd(window)) })
    }

    fn set_focus(&self, window: WindowHandleRef) -> Result<(), WindowError> {
        check_previous("SetFocus", || unsafe { SetFocus(hwnd(window)) })
    }

    fn flash_window(
        &self,
        window: WindowHandleRef,
        flags: FlashFlags,
        count: u32,
    ) -> Result<(), WindowError> {
        let info = FLASHWINFO {
            cbSize: std::mem::size_of::<FLASHWINFO>() as u32,
            hwnd: hwnd(window),
            dwFlags: flags.bits(),
            uCount: count,
            dwTimeout: 0,
        };
        // Returns the previous flash state, not a status.
        unsafe { FlashWindowEx(&info) };
        Ok(())
    }
}
