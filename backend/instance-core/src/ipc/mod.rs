//! One-shot activation protocol between a second launch and the running instance.
//!
//! # Protocol
//!
//! - The client connects, writes the literal `ACTIVATE`, and closes
//! - The server reads until EOF (bounded), compares byte for byte, and on a
//!   match posts an activation request to the UI thread
//! - There is no response, no framing, and no other message
//!
//! # Security
//!
//! Any local process that knows the channel name can trigger an activation.
//! The only effect is bringing the Searchlight window forward.

mod client;
mod dispatch;
mod handle;
mod message;
mod server;
mod state;

pub use client::{ActivationClient, NotifyOutcome};
pub use dispatch::{ActivationQueue, ActivationRequest, QueueDispatcher, UiDispatcher};
pub use message::{ACTIVATION_MESSAGE, ActivationMessage};
pub use server::ActivationServer;
pub use state::ActivationLoopState;

#[cfg(windows)]
pub use dispatch::ThreadMessageDispatcher;
