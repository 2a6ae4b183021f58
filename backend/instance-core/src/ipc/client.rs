//! Second-instance side of the activation protocol.

use crate::channel::{OutboundStream, connect_once, is_transient_connect_error, write_message};
use crate::config::InstanceConfig;
use crate::error::channel::ChannelError;
use crate::ipc::message::ActivationMessage;

use common::ErrorLocation;

use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{info, trace, warn};
use serde::Serialize;
use tokio::runtime::Builder as RuntimeBuilder;
use tokio::time::{sleep as TokioSleep, timeout as TokioTimeout};

const RETRY_INITIAL_INTERVAL: Duration = Duration::from_millis(20);
const RETRY_MAX_INTERVAL: Duration = Duration::from_millis(250);

/// What happened to a notification. None of these are errors for the caller,
/// which exits either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotifyOutcome {
    /// The message was written and the channel closed.
    Delivered,
    /// Nothing accepted a connection within the connect timeout.
    NoListener,
    /// The transport failed for another reason.
    Failed,
}

pub struct ActivationClient {
    config: InstanceConfig,
}

impl ActivationClient {
    pub fn new(config: &InstanceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Ask the running instance to bring its window forward.
    ///
    /// Bounded by the connect timeout for the connection plus the same budget
    /// for the write. Never fails; the outcome is logged and returned.
    pub async fn notify(&self) -> NotifyOutcome {
        match self.try_notify().await {
            Ok(()) => {
                info!("Activation request delivered to running instance");
                NotifyOutcome::Delivered
            }
            Err(ChannelError::Timeout { message, .. }) => {
                warn!("Running instance not reachable: {message}");
                NotifyOutcome::NoListener
            }
            Err(e) => {
                warn!("Failed to notify running instance: {e}");
                NotifyOutcome::Failed
            }
        }
    }

    /// [`notify`](Self::notify) on a private current-thread runtime.
    ///
    /// For the second-instance startup path, which runs before any runtime
    /// exists. Must not be called from inside a tokio runtime.
    pub fn notify_blocking(&self) -> NotifyOutcome {
        match RuntimeBuilder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(self.notify()),
            Err(e) => {
                warn!("Failed to build runtime for activation notify: {e}");
                NotifyOutcome::Failed
            }
        }
    }

    async fn try_notify(&self) -> Result<(), ChannelError> {
        let connect_timeout = self.config.connect_timeout();
        let mut stream = TokioTimeout(connect_timeout, self.connect_with_retry())
            .await
            .map_err(|_| ChannelError::Timeout {
                message: format!(
                    "No listener on '{}' within {connect_timeout:?}",
                    self.config.channel_name()
                ),
                location: ErrorLocation::caller(),
            })??;

        let payload = ActivationMessage::Activate.as_bytes();
        TokioTimeout(connect_timeout, write_message(&mut stream, payload))
            .await
            .map_err(|_| ChannelError::Write {
                message: format!("Write did not complete within {connect_timeout:?}"),
                location: ErrorLocation::caller(),
            })?
    }

    async fn connect_with_retry(&self) -> Result<OutboundStream, ChannelError> {
        let mut backoff = ExponentialBackoff {
            initial_interval: RETRY_INITIAL_INTERVAL,
            max_interval: RETRY_MAX_INTERVAL,
            max_elapsed_time: Some(self.config.connect_timeout()),
            ..Default::default()
        };
        backoff.reset();

        loop {
            match connect_once(&self.config).await {
                Ok(stream) => return Ok(stream),
                Err(e) if is_transient_connect_error(&e) => match backoff.next_backoff() {
                    Some(duration) => {
                        trace!("Activation channel not ready ({e}), retrying after {duration:?}");
                        TokioSleep(duration).await;
                    }
                    None => {
                        return Err(ChannelError::Timeout {
                            message: format!(
                                "No listener on '{}': {e}",
                                self.config.channel_name()
                            ),
                            location: ErrorLocation::caller(),
                        });
                    }
                },
                Err(e) => {
                    return Err(ChannelError::Connect {
                        message: format!(
                            "Failed to connect to '{}': {e}",
                            self.config.channel_name()
                        ),
                        location: ErrorLocation::caller(),
                    });
                }
            }
        }
    }
}
