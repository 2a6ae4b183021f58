use crate::config::InstanceConfig;
use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::fs;
use std::io::{Error as IoError, ErrorKind};
use std::path::PathBuf;

use log::{debug, warn};
use tokio::net::{UnixListener, UnixStream};

const SOCKET_EXTENSION: &str = "sock";

pub type InboundStream = UnixStream;
pub type OutboundStream = UnixStream;

/// A bound socket, accepted from one connection at a time. Its path is
/// removed on drop.
///
/// The listener lives as long as the endpoint. Clients that connect while the
/// server is busy wait in the backlog instead of being reset by a rebind.
pub struct InboundEndpoint {
    listener: UnixListener,
    path: PathBuf,
}

impl InboundEndpoint {
    pub async fn accept(&mut self) -> Result<InboundStream, ChannelError> {
        let (stream, _) = self
            .listener
            .accept()
            .await
            .map_err(|e| ChannelError::Accept {
                message: format!("Failed to accept on {}: {e}", self.path.display()),
                location: ErrorLocation::caller(),
            })?;
        Ok(stream)
    }
}

impl Drop for InboundEndpoint {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove socket {}: {e}", self.path.display()),
        }
    }
}

/// Bind the listening socket. Must be called from inside a tokio runtime.
pub fn bind(config: &InstanceConfig) -> Result<InboundEndpoint, ChannelError> {
    let dir = config.runtime_dir();
    fs::create_dir_all(&dir)?;

    let path = socket_path(config);

    // Only the gate holder binds, so anything already at the path is stale.
    match fs::remove_file(&path) {
        Ok(()) => debug!("Removed stale socket {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ChannelError::Bind {
                message: format!("Failed to clear stale socket {}: {e}", path.display()),
                location: ErrorLocation::caller(),
            });
        }
    }

    let listener = UnixListener::bind(&path).map_err(|e| ChannelError::Bind {
        message: format!("Failed to bind {}: {e}", path.display()),
        location: ErrorLocation::caller(),
    })?;

    Ok(InboundEndpoint { listener, path })
}

/// A single connection attempt, no retry.
pub async fn connect_once(config: &InstanceConfig) -> Result<OutboundStream, IoError> {
    UnixStream::connect(socket_path(config)).await
}

/// Nobody bound yet, or the server is rebinding after a fault.
pub(crate) fn is_transient_connect_error(error: &IoError) -> bool {
    matches!(
        error.kind(),
        ErrorKind::NotFound | ErrorKind::ConnectionRefused
    )
}

fn socket_path(config: &InstanceConfig) -> PathBuf {
    config.runtime_path(config.channel_name(), SOCKET_EXTENSION)
}
