use crate::helpers::{assert_no_request, isolated_config};

use instance_core::gate::InstanceGate;
use instance_core::ipc::{
    ActivationClient, ActivationLoopState, ActivationServer, NotifyOutcome, QueueDispatcher,
};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep as TokioSleep, timeout as TokioTimeout};

// ============================================================================
// ActivationServer start / cleanup lifecycle
// ============================================================================

/// **VALUE**: Verifies `cleanup()` stops the loop for good.
///
/// **WHY THIS MATTERS**: Cleanup runs before the gate is released. A loop that
/// kept serving afterwards could activate a window that is being torn down, or
/// steal activations meant for the next first instance.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The loop keeps accepting after cleanup
/// - A late notify panics or hangs
/// - The state never reaches `Stopped`
#[tokio::test]
async fn given_cleaned_up_server_when_client_notifies_then_no_listener_and_no_dispatch() {
    // GIVEN: A server that was started and cleaned up
    let (config, _dir) = isolated_config();
    let (dispatcher, mut queue) = QueueDispatcher::channel();
    let mut server = ActivationServer::new(&config);
    assert!(server.start_listening(Arc::new(dispatcher)));
    TokioSleep(Duration::from_millis(50)).await;
    server.cleanup().await;

    // WHEN: A client notifies
    let outcome = ActivationClient::new(&config).notify().await;

    // THEN: No listener, nothing dispatched, loop stopped
    assert_eq!(outcome, NotifyOutcome::NoListener);
    assert_no_request(&mut queue).await;
    assert_eq!(server.state(), ActivationLoopState::Stopped);
}

/// **VALUE**: Verifies state transitions are observable through `subscribe()`.
///
/// **BUG THIS CATCHES**: Would catch `cleanup()` returning before the loop
/// published `Stopped`.
#[tokio::test]
async fn given_listening_server_when_cleaned_up_then_subscriber_sees_stopped() {
    // GIVEN: A listening server and a subscriber
    let (config, _dir) = isolated_config();
    let (dispatcher, _queue) = QueueDispatcher::channel();
    let mut server = ActivationServer::new(&config);
    assert_eq!(server.state(), ActivationLoopState::NotStarted);
    assert!(server.start_listening(Arc::new(dispatcher)));
    assert_eq!(server.state(), ActivationLoopState::Listening);
    let mut states = server.subscribe();

    // WHEN: Cleaning up
    TokioTimeout(Duration::from_secs(2), server.cleanup())
        .await
        .expect("cleanup should finish within its timeout");

    // THEN: Terminal state observed
    let last = *states.borrow_and_update();
    assert!(last.is_terminal(), "Expected Stopped, got {last:?}");
}

/// **VALUE**: Verifies the loop cannot be started twice or restarted after cleanup.
///
/// **BUG THIS CATCHES**: Would catch a second loop racing the first for the
/// single endpoint instance.
#[tokio::test]
async fn given_started_server_when_started_again_then_refused() {
    // GIVEN: A started server
    let (config, _dir) = isolated_config();
    let (dispatcher, _queue) = QueueDispatcher::channel();
    let dispatcher = Arc::new(dispatcher);
    let mut server = ActivationServer::new(&config);
    assert!(server.start_listening(dispatcher.clone()));

    // WHEN / THEN: Starting again is refused, before and after cleanup
    assert!(!server.start_listening(dispatcher.clone()));
    server.cleanup().await;
    assert!(!server.start_listening(dispatcher));
    assert_eq!(server.state(), ActivationLoopState::Stopped);
}

/// **VALUE**: Verifies cleanup on a never-started server is harmless.
#[tokio::test]
async fn given_unstarted_server_when_cleaned_up_then_stopped_without_panic() {
    let (config, _dir) = isolated_config();
    let mut server = ActivationServer::new(&config);

    server.cleanup().await;
    server.cleanup().await;

    assert_eq!(server.state(), ActivationLoopState::Stopped);
}

/// **VALUE**: Verifies `start_listening` outside a runtime refuses instead of panicking.
#[test]
fn given_no_runtime_when_start_listening_then_returns_false() {
    let (config, _dir) = isolated_config();
    let (dispatcher, _queue) = QueueDispatcher::channel();
    let mut server = ActivationServer::new(&config);

    assert!(!server.start_listening(Arc::new(dispatcher)));
    assert_eq!(server.state(), ActivationLoopState::NotStarted);
}

/// **VALUE**: Verifies the full second-launch flow end to end: the gate says
/// "not first", the client notifies, the first instance dispatches once.
///
/// **WHY THIS MATTERS**: This is exactly what happens when the user launches
/// the app while it is already running.
///
/// **BUG THIS CATCHES**: Would catch the gate and channel disagreeing on names.
#[tokio::test]
async fn given_first_instance_running_when_second_launch_then_forwarded_and_activated() {
    // GIVEN: First instance holds the gate and listens
    let (config, _dir) = isolated_config();
    let mut first_gate = InstanceGate::new(&config);
    assert!(first_gate.try_acquire());
    let (dispatcher, mut queue) = QueueDispatcher::channel();
    let mut server = ActivationServer::new(&config);
    assert!(server.start_listening(Arc::new(dispatcher)));

    // WHEN: A second launch checks the gate (from another thread) and notifies
    let second_config = config.clone();
    let second_is_first = tokio::task::spawn_blocking(move || {
        let mut gate = InstanceGate::new(&second_config);
        gate.try_acquire()
    })
    .await
    .expect("Second launch task panicked");
    assert!(!second_is_first);
    let outcome = ActivationClient::new(&config).notify().await;

    // THEN: One activation reaches the first instance
    assert_eq!(outcome, NotifyOutcome::Delivered);
    let request = TokioTimeout(Duration::from_secs(3), queue.recv())
        .await
        .expect("Timed out waiting for activation")
        .expect("Queue closed");
    assert_eq!(request.sequence, 1);

    // Cleanup before release.
    server.cleanup().await;
    first_gate.release();
}
