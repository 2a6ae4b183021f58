//! Hand-off from the accept loop to the UI thread.
//!
//! Window objects are only touched on the UI thread, so the accept loop never
//! activates anything itself. It posts an [`ActivationRequest`] and moves on
//! without waiting; a wedged UI cannot stall the loop.

use crate::error::dispatch::DispatchError;

use common::ErrorLocation;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One accepted activation message, numbered in arrival order from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationRequest {
    pub sequence: u64,
}

/// Fire-and-forget enqueue onto the UI thread.
pub trait UiDispatcher: Send + Sync {
    fn post_activation(&self, request: ActivationRequest) -> Result<(), DispatchError>;
}

/// Dispatcher backed by an unbounded channel that the UI loop drains.
#[derive(Clone)]
pub struct QueueDispatcher {
    tx: UnboundedSender<ActivationRequest>,
}

/// Receiving half of [`QueueDispatcher`], owned by the UI loop.
pub struct ActivationQueue {
    rx: UnboundedReceiver<ActivationRequest>,
}

impl QueueDispatcher {
    pub fn channel() -> (QueueDispatcher, ActivationQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (QueueDispatcher { tx }, ActivationQueue { rx })
    }
}

impl UiDispatcher for QueueDispatcher {
    fn post_activation(&self, request: ActivationRequest) -> Result<(), DispatchError> {
        self.tx.send(request).map_err(|_| DispatchError::Closed {
            message: format!("UI queue closed, dropping activation #{}", request.sequence),
            location: ErrorLocation::caller(),
        })
    }
}

impl ActivationQueue {
    /// Wait for the next request. `None` once every dispatcher is dropped.
    pub async fn recv(&mut self) -> Option<ActivationRequest> {
        self.rx.recv().await
    }

    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Option<ActivationRequest> {
        self.rx.try_recv().ok()
    }
}

#[cfg(windows)]
mod thread_message {
    use super::{ActivationRequest, UiDispatcher};
    use crate::error::dispatch::DispatchError;

    use common::ErrorLocation;

    use windows_sys::Win32::Foundation::{ERROR_INVALID_THREAD_ID, GetLastError};
    use windows_sys::Win32::System::Threading::GetCurrentThreadId;
    use windows_sys::Win32::UI::WindowsAndMessaging::PostThreadMessageW;

    /// Posts a private thread message to the UI thread's message queue.
    ///
    /// The message carries no window handle; the UI thread resolves its main
    /// window when it handles the message.
    #[derive(Debug, Clone, Copy)]
    pub struct ThreadMessageDispatcher {
        thread_id: u32,
        message: u32,
    }

    impl ThreadMessageDispatcher {
        /// Target the calling thread. Call this from the UI thread.
        pub fn for_current_thread(message: u32) -> Self {
            Self {
                thread_id: unsafe { GetCurrentThreadId() },
                message,
            }
        }
    }

    impl UiDispatcher for ThreadMessageDispatcher {
        fn post_activation(&self, request: ActivationRequest) -> Result<(), DispatchError> {
            let posted = unsafe {
                PostThreadMessageW(self.thread_id, self.message, request.sequence as usize, 0)
            };
            if posted != 0 {
                return Ok(());
            }

            let code = unsafe { GetLastError() };
            if code == ERROR_INVALID_THREAD_ID {
                return Err(DispatchError::Closed {
                    message: format!("UI thread {} no longer exists", self.thread_id),
                    location: ErrorLocation::caller(),
                });
            }

            Err(DispatchError::Post {
                message: format!("PostThreadMessageW failed with error {code}"),
                location: ErrorLocation::caller(),
            })
        }
    }
}

#[cfg(windows)]
pub use thread_message::ThreadMessageDispatcher;
