//! Native main window and message loop.

use crate::error::SearchlightError;
use crate::shell::Shell;

use instance_core::APP_DISPLAY_NAME;
use instance_core::error::window::WindowError;
use instance_core::ipc::{ActivationServer, ThreadMessageDispatcher};
use instance_core::window::{
    ActivationOutcome, ActivationTarget, Win32WindowSystem, WindowActivator, WindowHandleRef,
};

use common::ErrorLocation;

use std::cell::Cell;
use std::ffi::c_void;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::Runtime;
use windows_sys::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{SetActiveWindow, SetFocus};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, DispatchMessageW, GWL_EXSTYLE, GetMessageW,
    GetWindowLongPtrW, IDC_ARROW, IsIconic, IsWindowVisible, LoadCursorW, MSG, PostQuitMessage, RegisterClassW,
    SW_HIDE, SW_RESTORE, SW_SHOW, SetWindowLongPtrW, ShowWindow, TranslateMessage, WM_APP,
    WM_DESTROY, WNDCLASSW, WS_EX_APPWINDOW, WS_EX_TOOLWINDOW, WS_OVERLAPPEDWINDOW,
};

/// Private thread message carrying one activation request (`wParam` = sequence).
pub const WM_SEARCHLIGHT_ACTIVATE: u32 = WM_APP + 1;

const CLASS_NAME: &str = "SearchlightMainWindow";
const WINDOW_WIDTH: i32 = 720;
const WINDOW_HEIGHT: i32 = 480;
const ERROR_CLASS_ALREADY_EXISTS: u32 = 1410;

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// The top-level Searchlight window.
///
/// The native window is created lazily; activation asks for the handle every
/// time instead of caching it.
pub struct MainWindow {
    hwnd: Cell<HWND>,
}

impl MainWindow {
    pub fn new() -> Self {
        Self {
            hwnd: Cell::new(std::ptr::null_mut()),
        }
    }

    fn create(&self) -> Result<HWND, WindowError> {
        let existing = self.hwnd.get();
        if !existing.is_null() {
            return Ok(existing);
        }

        let instance = unsafe { GetModuleHandleW(std::ptr::null()) };
        let class_name = to_wide(CLASS_NAME);

        let mut class: WNDCLASSW = unsafe { std::mem::zeroed() };
        class.lpfnWndProc = Some(main_wnd_proc);
        class.hInstance = instance;
        class.hCursor = unsafe { LoadCursorW(std::ptr::null_mut(), IDC_ARROW) };
        class.lpszClassName = class_name.as_ptr();

        let atom = unsafe { RegisterClassW(&class) };
        if atom == 0 {
            let error = unsafe { GetLastError() };
            if error != ERROR_CLASS_ALREADY_EXISTS {
                return Err(WindowError::call("RegisterClassW", error as i32));
            }
        }

        let title = to_wide(APP_DISPLAY_NAME);
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_APPWINDOW,
                class_name.as_ptr(),
                title.as_ptr(),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                WINDOW_WIDTH,
                WINDOW_HEIGHT,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                instance,
                std::ptr::null::<c_void>(),
            )
        };
        if hwnd.is_null() {
            return Err(WindowError::last_os_error("CreateWindowExW"));
        }

        self.hwnd.set(hwnd);
        debug!("Created main window {hwnd:?}");
        Ok(hwnd)
    }

    fn handle(&self) -> Result<HWND, WindowError> {
        let hwnd = self.hwnd.get();
        if hwnd.is_null() {
            return Err(WindowError::Toolkit {
                message: "Main window not created".to_string(),
                location: ErrorLocation::caller(),
            });
        }
        Ok(hwnd)
    }
}

impl Default for MainWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationTarget for MainWindow {
    fn native_handle(&self) -> Option<WindowHandleRef> {
        let hwnd = self.hwnd.get();
        (!hwnd.is_null()).then(|| WindowHandleRef(hwnd as isize))
    }

    fn ensure_handle(&self) -> Result<(), WindowError> {
        let hwnd = self.create()?;
        unsafe { ShowWindow(hwnd, SW_SHOW) };
        Ok(())
    }

    fn is_minimized(&self) -> bool {
        self.handle()
            .map(|hwnd| unsafe { IsIconic(hwnd) != 0 })
            .unwrap_or(false)
    }

    fn set_normal_state(&self) -> Result<(), WindowError> {
        let hwnd = self.handle()?;
        unsafe { ShowWindow(hwnd, SW_RESTORE) };
        Ok(())
    }

    fn set_visible(&self, visible: bool) -> Result<(), WindowError> {
        let hwnd = self.handle()?;
        unsafe { ShowWindow(hwnd, if visible { SW_SHOW } else { SW_HIDE }) };
        Ok(())
    }

    /// The taskbar only picks up an extended-style change when the window is
    /// shown, so a visible window is hidden around the change.
    fn set_show_in_taskbar(&self, show: bool) -> Result<(), WindowError> {
        let hwnd = self.handle()?;
        let current = unsafe { GetWindowLongPtrW(hwnd, GWL_EXSTYLE) } as u32;
        let Some(style) = taskbar_ex_style(current, show) else {
            return Ok(());
        };

        let visible = unsafe { IsWindowVisible(hwnd) } != 0;
        if visible {
            unsafe { ShowWindow(hwnd, SW_HIDE) };
        }
        unsafe { SetWindowLongPtrW(hwnd, GWL_EXSTYLE, style as isize) };
        if visible {
            unsafe { ShowWindow(hwnd, SW_SHOW) };
        }
        debug!("Taskbar button {}", if show { "shown" } else { "hidden" });
        Ok(())
    }

    fn activate(&self) -> Result<(), WindowError> {
        let hwnd = self.handle()?;
        unsafe { SetActiveWindow(hwnd) };
        Ok(())
    }

    fn focus(&self) -> Result<(), WindowError> {
        let hwnd = self.handle()?;
        unsafe { SetFocus(hwnd) };
        Ok(())
    }
}

/// Extended style with the taskbar button shown or hidden, or `None` when
/// `style` already matches.
pub(crate) fn taskbar_ex_style(style: u32, show: bool) -> Option<u32> {
    let updated = if show {
        (style | WS_EX_APPWINDOW) & !WS_EX_TOOLWINDOW
    } else {
        (style | WS_EX_TOOLWINDOW) & !WS_EX_APPWINDOW
    };
    (updated != style).then_some(updated)
}

unsafe extern "system" fn main_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            0
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Windows shell: one main window, activated on `WM_SEARCHLIGHT_ACTIVATE`.
pub struct Win32Shell {
    window: MainWindow,
    activator: WindowActivator<Win32WindowSystem>,
}

impl Win32Shell {
    pub fn new() -> Self {
        Self {
            window: MainWindow::new(),
            activator: WindowActivator::new(Win32WindowSystem),
        }
    }

    fn on_activate(&self, sequence: usize) {
        match self.activator.activate(&self.window) {
            ActivationOutcome::Foreground => info!("Activation #{sequence} raised the main window"),
            ActivationOutcome::Flashed => {
                info!("Activation #{sequence} refused foreground, flashed taskbar")
            }
            ActivationOutcome::NoHandle => warn!("Activation #{sequence} found no main window"),
        }
    }

    fn run_message_loop(&self) -> Result<(), SearchlightError> {
        let mut msg: MSG = unsafe { std::mem::zeroed() };
        loop {
            let status = unsafe { GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) };
            if status == -1 {
                let error = unsafe { GetLastError() };
                return Err(SearchlightError::Shell {
                    message: format!("GetMessageW failed with error {error}"),
                    location: ErrorLocation::caller(),
                });
            }
            if status == 0 {
                return Ok(());
            }

            // Thread messages have no window to dispatch to.
            if msg.hwnd.is_null() && msg.message == WM_SEARCHLIGHT_ACTIVATE {
                self.on_activate(msg.wParam);
                continue;
            }

            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl Default for Win32Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell for Win32Shell {
    fn run(self, runtime: &Runtime, server: &mut ActivationServer) -> Result<(), SearchlightError> {
        self.window
            .ensure_handle()
            .map_err(|e| SearchlightError::Shell {
                message: format!("Failed to create main window: {e}"),
                location: ErrorLocation::caller(),
            })?;

        // The window exists, so this thread now has a message queue to post to.
        let dispatcher = ThreadMessageDispatcher::for_current_thread(WM_SEARCHLIGHT_ACTIVATE);
        {
            let _runtime_guard = runtime.enter();
            if !server.start_listening(Arc::new(dispatcher)) {
                warn!("Activation server not started, later launches cannot reach this instance");
            }
        }

        info!("Main window shown, entering message loop");
        self.run_message_loop()
    }
}
