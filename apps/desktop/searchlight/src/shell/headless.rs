use crate::error::SearchlightError;
use crate::shell::Shell;

use instance_core::ipc::{ActivationServer, QueueDispatcher};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{error, info, warn};
use tokio::runtime::Runtime;
use tokio::sync::oneshot;

type StopSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Windowless shell: logs each activation request until told to stop.
pub struct HeadlessShell {
    stop: StopSignal,
    activations: Arc<AtomicU64>,
    ready: Option<oneshot::Sender<()>>,
}

impl HeadlessShell {
    pub fn until_ctrl_c() -> Self {
        Self::until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C, shutting down: {e}");
            }
        })
    }

    /// Run until `stop` completes.
    pub fn until<F>(stop: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            stop: Box::pin(stop),
            activations: Arc::new(AtomicU64::new(0)),
            ready: None,
        }
    }

    /// Signal `ready` once the activation server has been started.
    pub fn with_ready_signal(mut self, ready: oneshot::Sender<()>) -> Self {
        self.ready = Some(ready);
        self
    }

    /// Shared counter of activation requests handled so far.
    pub fn activation_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.activations)
    }
}

impl Shell for HeadlessShell {
    fn run(self, runtime: &Runtime, server: &mut ActivationServer) -> Result<(), SearchlightError> {
        let HeadlessShell {
            mut stop,
            activations,
            ready,
        } = self;

        let (dispatcher, mut queue) = QueueDispatcher::channel();
        let dispatcher = Arc::new(dispatcher);

        {
            let _runtime_guard = runtime.enter();
            if !server.start_listening(dispatcher.clone()) {
                warn!("Activation server not started, later launches cannot reach this instance");
            }
        }

        if let Some(ready) = ready {
            let _ = ready.send(());
        }

        info!("Searchlight running without a window, press Ctrl-C to exit");

        runtime.block_on(async move {
            // Held so the queue stays open even if the server never started.
            let _dispatcher = dispatcher;
            loop {
                tokio::select! {
                    _ = &mut stop => {
                        info!("Shutdown requested");
                        break;
                    }
                    Some(request) = queue.recv() => {
                        activations.fetch_add(1, Ordering::SeqCst);
                        info!("Activation request #{} received, no window to raise", request.sequence);
                    }
                }
            }
        });

        Ok(())
    }
}
