//! Shared building blocks for the Searchlight workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): Error location tracking shared by every error enum
//! - **instance-core**: Single-instance gate, activation channel and window activation
//! - **searchlight**: Application wiring (logging, startup, main window shell)

pub mod error;

pub use error::error_location::ErrorLocation;
