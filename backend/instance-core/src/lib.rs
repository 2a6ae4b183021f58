//! Single-instance coordination and cross-process window activation.
//!
//! The first Searchlight process holds a named exclusivity primitive
//! ([`gate::InstanceGate`]) and listens on a named channel
//! ([`ipc::ActivationServer`]). A second launch fails to acquire the gate, sends
//! one fixed message through [`ipc::ActivationClient`] and exits. The first
//! process then brings its main window forward with [`window::WindowActivator`].
//!
//! Nothing in this crate returns an error across its public operations: every
//! entry point is best effort and reports through `bool` or an outcome enum.
//! Internal faults are typed ([`error`]) and logged through the `log` facade.

pub mod channel;
pub mod config;
pub mod error;
pub mod gate;
pub mod ipc;
pub mod window;

#[cfg(test)]
mod tests;

pub const APP_DISPLAY_NAME: &str = "Searchlight";
