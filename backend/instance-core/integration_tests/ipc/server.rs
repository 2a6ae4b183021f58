use crate::helpers::{
    FlakyDispatcher, RECV_TIMEOUT, TEST_READ_TIMEOUT, assert_no_request, isolated_config,
};

use instance_core::channel::{connect_once, write_message};
use instance_core::config::InstanceConfig;
use instance_core::ipc::{
    ActivationClient, ActivationLoopState, ActivationQueue, ActivationRequest, ActivationServer,
    NotifyOutcome, QueueDispatcher,
};

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::time::{sleep as TokioSleep, timeout as TokioTimeout};

// ============================================================================
// ActivationServer message handling
// ============================================================================

fn start_server(config: &InstanceConfig) -> (ActivationServer, ActivationQueue) {
    let (dispatcher, queue) = QueueDispatcher::channel();
    let mut server = ActivationServer::new(config);
    assert!(server.start_listening(Arc::new(dispatcher)));
    (server, queue)
}

async fn expect_request(queue: &mut ActivationQueue) -> ActivationRequest {
    TokioTimeout(RECV_TIMEOUT, queue.recv())
        .await
        .expect("Timed out waiting for activation")
        .expect("Queue closed unexpectedly")
}

/// Send raw bytes the way a foreign local process might.
async fn send_raw(config: &InstanceConfig, payload: &[u8]) {
    let mut stream = None;
    for _ in 0..50 {
        match connect_once(config).await {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(_) => TokioSleep(Duration::from_millis(20)).await,
        }
    }
    let mut stream = stream.expect("Server never became connectable");
    // The server may stop reading once its buffer is full.
    let _ = write_message(&mut stream, payload).await;
}

/// **VALUE**: Verifies the exact literal produces exactly one dispatch.
///
/// **WHY THIS MATTERS**: This is the user-visible contract: launching a second
/// time brings the window forward once.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The server never dispatches
/// - One message is dispatched twice
/// - Sequence numbering does not start at 1
#[tokio::test]
async fn given_listening_server_when_client_notifies_then_exactly_one_dispatch() {
    // GIVEN: A listening server
    let (config, _dir) = isolated_config();
    let (mut server, mut queue) = start_server(&config);

    // WHEN: A client notifies
    let outcome = ActivationClient::new(&config).notify().await;

    // THEN: Delivered, one request, nothing more
    assert_eq!(outcome, NotifyOutcome::Delivered);
    assert_eq!(
        expect_request(&mut queue).await,
        ActivationRequest { sequence: 1 }
    );
    assert_no_request(&mut queue).await;

    server.cleanup().await;
}

/// **VALUE**: Verifies notifications sent back to back are each delivered and
/// dispatched exactly once.
///
/// **WHY THIS MATTERS**: A user double-clicking the launcher starts second
/// instances in quick succession. Each one exits after notifying, so a lost
/// notification is a launch that silently did nothing.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - A client that connects while the previous one is being served is reset
/// - The server rebinds between connections and drops queued clients
/// - Sequence numbers skip or repeat
#[tokio::test]
async fn given_listening_server_when_client_notifies_back_to_back_then_each_dispatched_once() {
    // GIVEN: A listening server
    let (config, _dir) = isolated_config();
    let (mut server, mut queue) = start_server(&config);
    let client = ActivationClient::new(&config);

    // WHEN: Five notifications with no pause between them
    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(client.notify().await);
    }

    // THEN: All delivered, dispatched in order, nothing extra
    assert!(
        outcomes.iter().all(|outcome| *outcome == NotifyOutcome::Delivered),
        "got: {outcomes:?}"
    );
    for expected in 1..=5 {
        assert_eq!(expect_request(&mut queue).await.sequence, expected);
    }
    assert_no_request(&mut queue).await;

    server.cleanup().await;
}

/// **VALUE**: Verifies two clients notifying at the same moment are both served.
///
/// **BUG THIS CATCHES**: Would catch the second client failing because the
/// single endpoint is busy with the first, instead of waiting its turn.
#[tokio::test]
async fn given_listening_server_when_two_clients_notify_concurrently_then_both_dispatched() {
    // GIVEN: A listening server and two independent clients
    let (config, _dir) = isolated_config();
    let (mut server, mut queue) = start_server(&config);
    let first = ActivationClient::new(&config);
    let second = ActivationClient::new(&config);

    // WHEN: Both notify concurrently
    let (a, b) = tokio::join!(first.notify(), second.notify());

    // THEN: Both delivered, two dispatches
    assert_eq!(a, NotifyOutcome::Delivered);
    assert_eq!(b, NotifyOutcome::Delivered);
    assert_eq!(expect_request(&mut queue).await.sequence, 1);
    assert_eq!(expect_request(&mut queue).await.sequence, 2);
    assert_no_request(&mut queue).await;

    server.cleanup().await;
}

/// **VALUE**: Verifies unrecognized bytes are ignored and the loop keeps serving.
///
/// **WHY THIS MATTERS**: Any local process can open the channel. Garbage must
/// neither activate the window nor kill the listener.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - A prefix or case-insensitive match activates the window
/// - The loop exits after an unexpected message
#[tokio::test]
async fn given_listening_server_when_other_bytes_sent_then_no_dispatch_and_still_serving() {
    // GIVEN: A listening server
    let (config, _dir) = isolated_config();
    let (mut server, mut queue) = start_server(&config);

    // WHEN: Foreign payloads arrive
    send_raw(&config, b"HELLO").await;
    send_raw(&config, b"activate").await;
    TokioSleep(Duration::from_millis(100)).await;

    // THEN: Nothing dispatched
    assert_no_request(&mut queue).await;

    // AND WHEN: A real client follows
    let outcome = ActivationClient::new(&config).notify().await;

    // THEN: It is still served, as request #1
    assert_eq!(outcome, NotifyOutcome::Delivered);
    assert_eq!(
        expect_request(&mut queue).await,
        ActivationRequest { sequence: 1 }
    );

    server.cleanup().await;
}

/// **VALUE**: Verifies a payload larger than the read buffer is rejected.
///
/// **WHY THIS MATTERS**: There is no framing; the buffer bound is what stops a
/// client from making the server allocate without limit.
///
/// **BUG THIS CATCHES**: Would catch a match on a truncated prefix.
#[tokio::test]
async fn given_oversized_payload_when_sent_then_no_dispatch() {
    // GIVEN: A listening server and a payload starting with the literal
    let (config, _dir) = isolated_config();
    let (mut server, mut queue) = start_server(&config);
    let mut payload = b"ACTIVATE".to_vec();
    payload.resize(config.read_buffer_size() + 64, b'!');

    // WHEN: Sending it
    send_raw(&config, &payload).await;
    TokioSleep(Duration::from_millis(150)).await;

    // THEN: No dispatch
    assert_no_request(&mut queue).await;

    server.cleanup().await;
}

/// **VALUE**: Verifies a client that connects and never sends is timed out.
///
/// **WHY THIS MATTERS**: The server handles one connection at a time. A silent
/// client would otherwise block every later activation.
///
/// **BUG THIS CATCHES**: Would catch a read with no timeout.
#[tokio::test]
async fn given_silent_client_when_read_times_out_then_loop_serves_next_client() {
    // GIVEN: A listening server and a client holding the connection open
    let (config, _dir) = isolated_config();
    let (mut server, mut queue) = start_server(&config);

    let mut silent = None;
    for _ in 0..50 {
        if let Ok(stream) = connect_once(&config).await {
            silent = Some(stream);
            break;
        }
        TokioSleep(Duration::from_millis(20)).await;
    }
    let mut silent = silent.expect("Server never became connectable");

    // WHEN: The read timeout passes
    TokioSleep(TEST_READ_TIMEOUT + Duration::from_millis(200)).await;
    let _ = silent.shutdown().await;
    drop(silent);

    // THEN: The next client is still served
    let outcome = ActivationClient::new(&config).notify().await;
    assert_eq!(outcome, NotifyOutcome::Delivered);
    assert_eq!(expect_request(&mut queue).await.sequence, 1);

    server.cleanup().await;
}

/// **VALUE**: Verifies a failing dispatcher does not stop the loop.
///
/// **WHY THIS MATTERS**: The UI side can be briefly unavailable (window being
/// rebuilt, message queue full). Later activations must still work.
///
/// **BUG THIS CATCHES**: Would catch a dispatch error propagating out of the loop.
#[tokio::test]
async fn given_failing_dispatcher_when_notified_twice_then_second_delivered() {
    // GIVEN: A dispatcher that fails its first call
    let (config, _dir) = isolated_config();
    let (inner, mut queue) = QueueDispatcher::channel();
    let dispatcher = Arc::new(FlakyDispatcher::failing_first(inner));
    let mut server = ActivationServer::new(&config);
    assert!(server.start_listening(dispatcher.clone()));
    let client = ActivationClient::new(&config);

    // WHEN: Two notifications
    assert_eq!(client.notify().await, NotifyOutcome::Delivered);
    assert_eq!(client.notify().await, NotifyOutcome::Delivered);

    // THEN: The second one reaches the queue
    assert_eq!(expect_request(&mut queue).await.sequence, 2);
    assert_eq!(dispatcher.calls(), 2);
    assert_eq!(server.state(), ActivationLoopState::Listening);

    server.cleanup().await;
}

/// **VALUE**: Verifies a panicking dispatcher does not kill the loop.
///
/// **BUG THIS CATCHES**: Would catch a panic unwinding through the accept task.
#[tokio::test]
async fn given_panicking_dispatcher_when_notified_twice_then_second_delivered() {
    // GIVEN: A dispatcher that panics on its first call
    let (config, _dir) = isolated_config();
    let (inner, mut queue) = QueueDispatcher::channel();
    let dispatcher = Arc::new(FlakyDispatcher::panicking_first(inner));
    let mut server = ActivationServer::new(&config);
    assert!(server.start_listening(dispatcher.clone()));
    let client = ActivationClient::new(&config);

    // WHEN: Two notifications
    assert_eq!(client.notify().await, NotifyOutcome::Delivered);
    assert_eq!(client.notify().await, NotifyOutcome::Delivered);

    // THEN: The second one reaches the queue
    assert_eq!(expect_request(&mut queue).await.sequence, 2);
    assert_eq!(server.state(), ActivationLoopState::Listening);

    server.cleanup().await;
}
