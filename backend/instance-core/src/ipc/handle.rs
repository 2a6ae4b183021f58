//! Owned handle to the background accept loop.

use std::time::Duration;

use log::warn;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout as TokioTimeout;

/// The spawned loop task plus the signal that asks it to stop.
///
/// Dropping the handle signals shutdown but does not wait; use
/// [`shutdown`](Self::shutdown) to wait for the loop to exit.
pub(crate) struct ListenerHandle {
    task: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl ListenerHandle {
    pub(crate) fn new(task: JoinHandle<()>, shutdown_tx: watch::Sender<bool>) -> Self {
        Self {
            task: Some(task),
            shutdown_tx,
        }
    }

    pub(crate) fn signal(&self) {
        // Err only means the loop already exited and dropped its receiver.
        let _ = self.shutdown_tx.send(true);
    }

    /// Signal shutdown and wait up to `timeout` for the loop to exit.
    ///
    /// Returns `false` if the loop had to be aborted.
    pub(crate) async fn shutdown(mut self, timeout: Duration) -> bool {
        self.signal();

        let Some(task) = self.task.take() else {
            return true;
        };
        let abort = task.abort_handle();

        match TokioTimeout(timeout, task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Activation loop task ended abnormally: {e}");
                true
            }
            Err(_) => {
                abort.abort();
                false
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.signal();
    }
}
