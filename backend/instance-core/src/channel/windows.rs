use crate::config::InstanceConfig;
use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};

use tokio::net::windows::named_pipe::{
    ClientOptions, NamedPipeClient, NamedPipeServer, PipeMode, ServerOptions,
};
use windows_sys::Win32::Foundation::ERROR_PIPE_BUSY;

const PIPE_PREFIX: &str = r"\\.\pipe\";

pub type InboundStream = NamedPipeServer;
pub type OutboundStream = NamedPipeClient;

/// The pipe name plus its single inbound instance.
///
/// Pipe instances are not reused across connections. Each accept hands the
/// connected instance to the caller, and the next accept creates a new one
/// once the caller has dropped it. Until then clients see `ERROR_PIPE_BUSY`
/// and retry.
pub struct InboundEndpoint {
    name: String,
    in_buffer_size: u32,
    server: Option<NamedPipeServer>,
}

impl InboundEndpoint {
    pub async fn accept(&mut self) -> Result<InboundStream, ChannelError> {
        let server = match self.server.take() {
            Some(server) => server,
            None => create_instance(&self.name, self.in_buffer_size)?,
        };

        server.connect().await.map_err(|e| ChannelError::Accept {
            message: format!("Failed waiting for pipe client: {e}"),
            location: ErrorLocation::caller(),
        })?;
        Ok(server)
    }
}

/// Create the first pipe instance. Fails if any other instance with this
/// name exists, including one owned by an unrelated application.
pub fn bind(config: &InstanceConfig) -> Result<InboundEndpoint, ChannelError> {
    let name = pipe_name(config);
    let in_buffer_size = u32::try_from(config.read_buffer_size()).unwrap_or(u32::MAX);
    let server = create_instance(&name, in_buffer_size)?;

    Ok(InboundEndpoint {
        name,
        in_buffer_size,
        server: Some(server),
    })
}

fn create_instance(name: &str, in_buffer_size: u32) -> Result<NamedPipeServer, ChannelError> {
    ServerOptions::new()
        .first_pipe_instance(true)
        .access_inbound(true)
        .access_outbound(false)
        .pipe_mode(PipeMode::Byte)
        .max_instances(1)
        .in_buffer_size(in_buffer_size)
        .out_buffer_size(0)
        .create(name)
        .map_err(|e| ChannelError::Bind {
            message: format!("Failed to create pipe {name}: {e}"),
            location: ErrorLocation::caller(),
        })
}

/// A single connection attempt, no retry.
pub async fn connect_once(config: &InstanceConfig) -> Result<OutboundStream, IoError> {
    ClientOptions::new()
        .read(false)
        .write(true)
        .pipe_mode(PipeMode::Byte)
        .open(pipe_name(config))
}

/// The pipe does not exist yet, or its only instance is busy with another client.
pub(crate) fn is_transient_connect_error(error: &IoError) -> bool {
    error.kind() == ErrorKind::NotFound || error.raw_os_error() == Some(ERROR_PIPE_BUSY as i32)
}

fn pipe_name(config: &InstanceConfig) -> String {
    format!("{PIPE_PREFIX}{}", config.channel_name())
}
