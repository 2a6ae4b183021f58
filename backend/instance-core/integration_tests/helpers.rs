//! Shared setup for the instance-core integration tests.
//!
//! Every test gets its own names and runtime directory so tests can run in
//! parallel without seeing each other's lock files, sockets or pipes.

use instance_core::config::InstanceConfig;
use instance_core::error::dispatch::DispatchError;
use instance_core::ipc::{ActivationQueue, ActivationRequest, QueueDispatcher, UiDispatcher};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::timeout as TokioTimeout;
use uuid::Uuid;

pub const TEST_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
pub const TEST_READ_TIMEOUT: Duration = Duration::from_millis(400);
pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);
pub const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Fresh config with unique names, a private runtime dir and short timings.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn isolated_config() -> (InstanceConfig, TempDir) {
    let dir = TempDir::new().expect("Failed to create runtime dir");
    // Short id keeps Unix socket paths under the sun_path limit.
    let id = format!("sl-{}", &Uuid::new_v4().simple().to_string()[..12]);

    let config = InstanceConfig::for_app(&id)
        .expect("Generated app id should be valid")
        .with_runtime_dir(dir.path())
        .with_connect_timeout(TEST_CONNECT_TIMEOUT)
        .with_read_timeout(TEST_READ_TIMEOUT)
        .with_cleanup_timeout(Duration::from_secs(1))
        .with_fault_backoff(Duration::from_millis(50), Duration::from_millis(20));

    (config, dir)
}

/// Dispatcher that misbehaves on its first call, then forwards to a queue.
pub struct FlakyDispatcher {
    calls: AtomicUsize,
    panic_first: bool,
    inner: QueueDispatcher,
}

impl FlakyDispatcher {
    pub fn failing_first(inner: QueueDispatcher) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            panic_first: false,
            inner,
        }
    }

    pub fn panicking_first(inner: QueueDispatcher) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            panic_first: true,
            inner,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UiDispatcher for FlakyDispatcher {
    fn post_activation(&self, request: ActivationRequest) -> Result<(), DispatchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            if self.panic_first {
                panic!("UI dispatcher blew up on request #{}", request.sequence);
            }
            return Err(DispatchError::Post {
                message: "UI thread not ready".to_string(),
                location: common::ErrorLocation::caller(),
            });
        }
        self.inner.post_activation(request)
    }
}

/// Assert no activation arrives within [`QUIET_PERIOD`]. A closed queue counts
/// as nothing arriving.
pub async fn assert_no_request(queue: &mut ActivationQueue) {
    let next = TokioTimeout(QUIET_PERIOD, queue.recv()).await;
    assert!(
        !matches!(next, Ok(Some(_))),
        "Unexpected activation: {next:?}"
    );
}
