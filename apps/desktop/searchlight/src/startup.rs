//! Process startup: decide whether this launch is the primary instance.
//!
//! ```text
//! gate held elsewhere?  ── yes ──> notify running instance ──> exit (Forwarded)
//!         │ no
//!         v
//! build runtime ─> shell starts server + runs UI ─> server.cleanup() ─> gate.release()
//! ```
//!
//! Cleanup strictly precedes release so a new primary never races a stale
//! listener for the channel.

use crate::error::SearchlightError;
use crate::logger::initialize as LoggerInitialize;
use crate::settings::Settings;
use crate::shell::{Shell, platform_shell};

use instance_core::config::InstanceConfig;
use instance_core::gate::InstanceGate;
use instance_core::ipc::{ActivationClient, ActivationServer, NotifyOutcome};

use common::ErrorLocation;

use log::{info, warn};
use serde::Serialize;
use tokio::runtime::Builder as RuntimeBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StartupOutcome {
    /// Another instance was running; it was asked to come forward.
    Forwarded(NotifyOutcome),
    /// This process ran as the primary instance and has shut down.
    Primary,
}

/// Initialize logging, then run as primary or forward to the running instance.
pub fn run(settings: &Settings) -> Result<StartupOutcome, SearchlightError> {
    LoggerInitialize(settings.log_dir(), settings.log_level())?;

    info!(
        "Searchlight {} starting (pid {})",
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    );
    settings.report();

    run_instance(&InstanceConfig::default(), platform_shell())
}

/// The single-instance decision and primary lifecycle, with the shell injected.
pub fn run_instance<S: Shell>(
    config: &InstanceConfig,
    shell: S,
) -> Result<StartupOutcome, SearchlightError> {
    let mut gate = InstanceGate::new(config);

    if !gate.try_acquire() {
        let outcome = ActivationClient::new(config).notify_blocking();
        match outcome {
            NotifyOutcome::Delivered => info!("Searchlight is already running, asked it to come forward"),
            NotifyOutcome::NoListener | NotifyOutcome::Failed => {
                warn!("Searchlight is already running but did not respond ({outcome:?})")
            }
        }
        return Ok(StartupOutcome::Forwarded(outcome));
    }

    let runtime = RuntimeBuilder::new_multi_thread()
        .enable_all()
        .thread_name("searchlight-io")
        .build()
        .map_err(|e| SearchlightError::Runtime {
            message: format!("Failed to build tokio runtime: {e}"),
            location: ErrorLocation::caller(),
        })?;

    let mut server = ActivationServer::new(config);
    let shell_result = shell.run(&runtime, &mut server);

    runtime.block_on(server.cleanup());
    gate.release();
    info!("Searchlight shut down");

    shell_result.map(|()| StartupOutcome::Primary)
}
