use crate::error::dispatch::DispatchError;
use crate::ipc::{ActivationRequest, QueueDispatcher, UiDispatcher};

/// **VALUE**: Verifies posted requests reach the queue in order.
///
/// **BUG THIS CATCHES**: Would catch the queue reordering or dropping requests.
#[tokio::test]
async fn given_queue_dispatcher_when_requests_posted_then_received_in_order() {
    // GIVEN: A dispatcher and its queue
    let (dispatcher, mut queue) = QueueDispatcher::channel();

    // WHEN: Posting two requests
    dispatcher
        .post_activation(ActivationRequest { sequence: 1 })
        .expect("queue open");
    dispatcher
        .post_activation(ActivationRequest { sequence: 2 })
        .expect("queue open");

    // THEN: Both arrive in order, then the queue is empty
    assert_eq!(queue.recv().await, Some(ActivationRequest { sequence: 1 }));
    assert_eq!(queue.try_recv(), Some(ActivationRequest { sequence: 2 }));
    assert_eq!(queue.try_recv(), None);
}

/// **VALUE**: Verifies posting to a closed queue is an error, not a panic.
///
/// **WHY THIS MATTERS**: During shutdown the UI loop drops its queue before the
/// accept loop is told to stop. A late activation must be dropped quietly.
///
/// **BUG THIS CATCHES**: Would catch an `unwrap` on the send result.
#[test]
fn given_dropped_queue_when_request_posted_then_closed_error() {
    // GIVEN: A dispatcher whose queue is gone
    let (dispatcher, queue) = QueueDispatcher::channel();
    drop(queue);

    // WHEN: Posting
    let result = dispatcher.post_activation(ActivationRequest { sequence: 7 });

    // THEN: Closed error naming the request
    match result {
        Err(DispatchError::Closed { message, .. }) => assert!(message.contains("#7")),
        other => panic!("Expected Closed error, got {other:?}"),
    }
}

/// **VALUE**: Verifies the queue ends once every dispatcher is dropped.
#[tokio::test]
async fn given_all_dispatchers_dropped_when_queue_polled_then_none() {
    let (dispatcher, mut queue) = QueueDispatcher::channel();
    drop(dispatcher);

    assert_eq!(queue.recv().await, None);
}
