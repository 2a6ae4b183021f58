use crate::error::channel::ChannelError;
use crate::error::server::{FaultClass, ServerError};

use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};

/// **VALUE**: Verifies transport failures take the IO backoff and everything
/// else the shorter one.
///
/// **WHY THIS MATTERS**: The accept loop picks its retry delay from this
/// classification. A busy endpoint needs the longer pause to clear.
///
/// **BUG THIS CATCHES**: Would catch the two classes being swapped.
#[test]
fn given_server_errors_when_classified_then_transport_is_io_and_fault_is_other() {
    // GIVEN: One error of each kind
    let transport: ServerError = ChannelError::from(IoError::from(ErrorKind::BrokenPipe)).into();
    let fault = ServerError::Fault {
        message: "iteration panicked".to_string(),
        location: ErrorLocation::caller(),
    };

    // THEN: Classified as expected
    assert_eq!(transport.class(), FaultClass::Io);
    assert_eq!(fault.class(), FaultClass::Other);
}

/// **VALUE**: Verifies a timed-out IO error becomes a channel timeout.
///
/// **WHY THIS MATTERS**: The client reports `NoListener` only for timeouts.
///
/// **BUG THIS CATCHES**: Would catch timeouts being folded into generic IO.
#[test]
fn given_timed_out_io_error_when_converted_then_channel_timeout() {
    let error = ChannelError::from(IoError::from(ErrorKind::TimedOut));
    assert!(matches!(error, ChannelError::Timeout { .. }));

    let error = ChannelError::from(IoError::from(ErrorKind::PermissionDenied));
    assert!(matches!(error, ChannelError::Io { .. }));
}
