use crate::error::window::WindowError;
use crate::window::types::{FlashFlags, ShowCommand, WindowHandleRef};

/// The OS window-manager calls used by the activation sequence.
///
/// Methods take `&self`; implementations are thin wrappers over stateless
/// system calls.
pub trait WindowSystem {
    fn is_iconic(&self, window: WindowHandleRef) -> bool;

    fn show_window(&self, window: WindowHandleRef, command: ShowCommand);

    fn foreground_window(&self) -> Option<WindowHandleRef>;

    /// Id of the thread that created `window`, `None` if it cannot be resolved.
    fn window_thread_id(&self, window: WindowHandleRef) -> Option<u32>;

    fn current_thread_id(&self) -> u32;

    /// Attach (`attach == true`) or detach the input queue of `from` to `to`.
    fn attach_thread_input(&self, from: u32, to: u32, attach: bool) -> Result<(), WindowError>;

    fn bring_window_to_top(&self, window: WindowHandleRef) -> Result<(), WindowError>;

    fn set_foreground_window(&self, window: WindowHandleRef) -> Result<(), WindowError>;

    fn set_active_window(&self, window: WindowHandleRef) -> Result<(), WindowError>;

    fn set_focus(&self, window: WindowHandleRef) -> Result<(), WindowError>;

    fn flash_window(
        &self,
        window: WindowHandleRef,
        flags: FlashFlags,
        count: u32,
    ) -> Result<(), WindowError>;
}

/// The toolkit's top-level window, as seen by the activation sequence.
///
/// Only ever used on the UI thread.
pub trait ActivationTarget {
    /// Current native handle, `None` if the toolkit has not created one yet.
    fn native_handle(&self) -> Option<WindowHandleRef>;

    /// Force handle creation (show plus a layout pass).
    fn ensure_handle(&self) -> Result<(), WindowError>;

    fn is_minimized(&self) -> bool;

    fn set_normal_state(&self) -> Result<(), WindowError>;

    fn set_visible(&self, visible: bool) -> Result<(), WindowError>;

    fn set_show_in_taskbar(&self, show: bool) -> Result<(), WindowError>;

    fn activate(&self) -> Result<(), WindowError>;

    fn focus(&self) -> Result<(), WindowError>;
}
