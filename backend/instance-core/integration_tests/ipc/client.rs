use crate::helpers::{TEST_CONNECT_TIMEOUT, isolated_config};

use instance_core::ipc::{ActivationClient, NotifyOutcome};

use std::time::{Duration, Instant};

// ============================================================================
// ActivationClient without a running instance
// ============================================================================

/// **VALUE**: Verifies `notify()` reports `NoListener` when nobody listens,
/// and does so within the connect timeout.
///
/// **WHY THIS MATTERS**: A second launch racing a first instance that is still
/// starting (or already exiting) must give up quickly and exit, not hang.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Connect retries ignore the timeout and spin forever
/// - A missing endpoint is reported as `Failed` instead of `NoListener`
/// - The client panics when nothing is bound
#[tokio::test]
async fn given_no_listener_when_notified_then_no_listener_within_timeout() {
    // GIVEN: Nothing bound on the channel
    let (config, _dir) = isolated_config();
    let client = ActivationClient::new(&config);

    // WHEN: Notifying
    let started = Instant::now();
    let outcome = client.notify().await;
    let elapsed = started.elapsed();

    // THEN: NoListener, within the bound plus scheduling slack
    assert_eq!(outcome, NotifyOutcome::NoListener);
    assert!(
        elapsed < TEST_CONNECT_TIMEOUT + Duration::from_millis(500),
        "notify took {elapsed:?}"
    );
}

/// **VALUE**: Verifies the blocking wrapper works outside any runtime.
///
/// **WHY THIS MATTERS**: The second instance notifies from plain `main`
/// before any runtime exists.
///
/// **BUG THIS CATCHES**: Would catch `notify_blocking` assuming an ambient
/// runtime and panicking.
#[test]
fn given_no_runtime_when_notify_blocking_then_returns_outcome() {
    // GIVEN: Plain thread, no listener
    let (config, _dir) = isolated_config();
    let client = ActivationClient::new(&config);

    // WHEN: Notifying synchronously
    let outcome = client.notify_blocking();

    // THEN: Clean NoListener
    assert_eq!(outcome, NotifyOutcome::NoListener);
}
