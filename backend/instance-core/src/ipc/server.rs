//! First-instance side of the activation protocol.
//!
//! [`ActivationServer`] owns one background task that serves the activation
//! channel for the lifetime of the process:
//!
//! 1. Bind the endpoint if it is not bound yet
//! 2. Wait for a client (no timeout)
//! 3. Read until EOF, bounded by the buffer size and a read timeout
//! 4. On an exact `ACTIVATE`, post a request to the UI thread
//! 5. Drop the connection and start over
//!
//! Connections are served strictly one at a time. The endpoint is dropped and
//! rebound only after a bind or accept failure, or a panic mid-accept.
//!
//! Failures never end the loop. Transport faults back off for the IO delay,
//! anything else (including a panic inside an iteration) for the shorter one.
//! Only [`ActivationServer::cleanup`] (or dropping the server) stops it.

use crate::channel::{InboundEndpoint, bind, read_message};
use crate::config::InstanceConfig;
use crate::error::server::{FaultClass, ServerError};
use crate::ipc::dispatch::{ActivationRequest, UiDispatcher};
use crate::ipc::handle::ListenerHandle;
use crate::ipc::message::ActivationMessage;
use crate::ipc::state::ActivationLoopState;

use common::ErrorLocation;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures_util::FutureExt;
use log::{debug, error, info, trace, warn};
use tokio::runtime::Handle as RuntimeHandle;
use tokio::sync::watch;
use tokio::time::sleep as TokioSleep;

pub struct ActivationServer {
    config: InstanceConfig,
    state_tx: Arc<watch::Sender<ActivationLoopState>>,
    handle: Option<ListenerHandle>,
}

impl ActivationServer {
    pub fn new(config: &InstanceConfig) -> Self {
        let (state_tx, _) = watch::channel(ActivationLoopState::NotStarted);
        Self {
            config: config.clone(),
            state_tx: Arc::new(state_tx),
            handle: None,
        }
    }

    /// Spawn the accept loop on the current tokio runtime.
    ///
    /// Returns `false` without spawning if the server was already started (or
    /// cleaned up), or if called outside a runtime.
    pub fn start_listening(&mut self, dispatcher: Arc<dyn UiDispatcher>) -> bool {
        let current = *self.state_tx.borrow();
        if current != ActivationLoopState::NotStarted {
            warn!("Activation server already {current:?}, ignoring start request");
            return false;
        }

        let runtime = match RuntimeHandle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Activation server needs a tokio runtime: {e}");
                return false;
            }
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.state_tx.send_replace(ActivationLoopState::Listening);

        let task = runtime.spawn(accept_loop(
            self.config.clone(),
            dispatcher,
            Arc::clone(&self.state_tx),
            shutdown_rx,
        ));
        self.handle = Some(ListenerHandle::new(task, shutdown_tx));
        true
    }

    pub fn state(&self) -> ActivationLoopState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ActivationLoopState> {
        self.state_tx.subscribe()
    }

    /// Stop the loop and wait for it to exit, up to the cleanup timeout.
    ///
    /// After this returns the state is `Stopped` and no further activation is
    /// dispatched. Call it before releasing the instance gate.
    pub async fn cleanup(&mut self) {
        let Some(handle) = self.handle.take() else {
            self.state_tx.send_replace(ActivationLoopState::Stopped);
            return;
        };

        self.state_tx.send_replace(ActivationLoopState::Cancelling);
        info!("Stopping activation server");

        let timeout = self.config.cleanup_timeout();
        if !handle.shutdown(timeout).await {
            warn!("Activation loop did not stop within {timeout:?}, aborted");
        }

        self.state_tx.send_replace(ActivationLoopState::Stopped);
    }
}

async fn accept_loop(
    config: InstanceConfig,
    dispatcher: Arc<dyn UiDispatcher>,
    state_tx: Arc<watch::Sender<ActivationLoopState>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(
        "Activation server listening on '{}'",
        config.channel_name()
    );

    let cancel = shutdown_rx.clone();
    let mut endpoint: Option<InboundEndpoint> = None;
    let mut sequence = 0u64;

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let iteration = AssertUnwindSafe(serve_one(
            &config,
            &mut endpoint,
            dispatcher.as_ref(),
            &cancel,
            &mut sequence,
        ))
        .catch_unwind();

        let result = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            result = iteration => result.unwrap_or_else(|_| Err(ServerError::Fault {
                message: "Activation loop iteration panicked".to_string(),
                location: ErrorLocation::caller(),
            })),
        };

        if let Err(e) = result {
            let delay = match e.class() {
                FaultClass::Io => config.io_fault_backoff(),
                FaultClass::Other => config.other_fault_backoff(),
            };
            warn!("Activation loop error, retrying in {delay:?}: {e}");

            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                _ = TokioSleep(delay) => {}
            }
        }
    }

    state_tx.send_replace(ActivationLoopState::Stopped);
    info!("Activation server stopped");
}

/// Serve exactly one connection.
///
/// The endpoint goes back into `slot` only after a successful accept, so a
/// failed or interrupted accept leaves the slot empty and the next iteration
/// rebinds.
async fn serve_one(
    config: &InstanceConfig,
    slot: &mut Option<InboundEndpoint>,
    dispatcher: &dyn UiDispatcher,
    cancel: &watch::Receiver<bool>,
    sequence: &mut u64,
) -> Result<(), ServerError> {
    let mut endpoint = match slot.take() {
        Some(endpoint) => endpoint,
        None => bind(config)?,
    };
    trace!("Waiting for activation client");

    let mut stream = endpoint.accept().await?;
    *slot = Some(endpoint);
    let payload = read_message(
        &mut stream,
        config.read_buffer_size(),
        config.read_timeout(),
    )
    .await?;
    drop(stream);

    match ActivationMessage::parse(&payload) {
        Some(ActivationMessage::Activate) => {
            if *cancel.borrow() {
                debug!("Shutdown requested, dropping activation message");
                return Ok(());
            }
            *sequence += 1;
            dispatch(dispatcher, ActivationRequest { sequence: *sequence });
        }
        None => {
            debug!(
                "Ignoring unrecognized activation message ({} bytes): {:?}",
                payload.len(),
                String::from_utf8_lossy(&payload)
            );
        }
    }

    Ok(())
}

/// Post to the UI thread, swallowing both errors and panics.
fn dispatch(dispatcher: &dyn UiDispatcher, request: ActivationRequest) {
    match catch_unwind(AssertUnwindSafe(|| dispatcher.post_activation(request))) {
        Ok(Ok(())) => info!("Posted activation #{} to UI thread", request.sequence),
        Ok(Err(e)) => warn!("Failed to post activation #{}: {e}", request.sequence),
        Err(_) => error!(
            "Dispatcher panicked while posting activation #{}",
            request.sequence
        ),
    }
}
