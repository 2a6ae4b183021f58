//! Named, one-directional byte channel between two local processes.
//!
//! Windows uses an inbound-only named pipe limited to a single instance, which
//! is recreated after every connection. Unix uses a Unix domain socket in the
//! runtime directory whose listener stays bound while the server runs. On
//! both, an [`InboundEndpoint`] hands out one connection at a time and the
//! caller finishes with it before accepting the next.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use self::unix as platform;
#[cfg(windows)]
use self::windows as platform;

pub use platform::{InboundEndpoint, InboundStream, OutboundStream, bind, connect_once};
pub(crate) use platform::is_transient_connect_error;

use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout as TokioTimeout;

/// Read until the peer closes or `capacity` bytes have arrived.
///
/// Bytes beyond `capacity` are never read, so an oversized payload comes back
/// truncated to exactly `capacity` bytes.
///
/// # Errors
///
/// - [`ChannelError::Read`] if the stream fails mid-read
/// - [`ChannelError::Timeout`] if the peer neither closes nor fills the buffer in time
pub async fn read_message<R>(
    stream: &mut R,
    capacity: usize,
    timeout: Duration,
) -> Result<Vec<u8>, ChannelError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; capacity];
    let mut filled = 0;

    let read_all = async {
        while filled < capacity {
            match stream.read(&mut buf[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                // Pipe clients that close right after writing surface as a broken pipe.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => break,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    };

    match TokioTimeout(timeout, read_all).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(ChannelError::Read {
                message: format!("Failed to read activation message: {e}"),
                location: ErrorLocation::caller(),
            });
        }
        Err(_) => {
            return Err(ChannelError::Timeout {
                message: format!("Peer did not finish sending within {timeout:?}"),
                location: ErrorLocation::caller(),
            });
        }
    }

    buf.truncate(filled);
    Ok(buf)
}

/// Write the whole payload, flush, and shut the write side down.
pub async fn write_message<W>(stream: &mut W, payload: &[u8]) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin,
{
    stream
        .write_all(payload)
        .await
        .map_err(|e| ChannelError::Write {
            message: format!("Failed to write activation message: {e}"),
            location: ErrorLocation::caller(),
        })?;

    stream.flush().await.map_err(|e| ChannelError::Write {
        message: format!("Failed to flush activation message: {e}"),
        location: ErrorLocation::caller(),
    })?;

    stream.shutdown().await?;
    Ok(())
}
