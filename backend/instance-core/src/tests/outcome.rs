use crate::gate::AcquireOutcome;
use crate::ipc::{ActivationLoopState, NotifyOutcome};
use crate::window::ActivationOutcome;

/// **VALUE**: Verifies outcome enums serialize as their bare variant names.
///
/// **WHY THIS MATTERS**: The app reports these in structured form (startup
/// outcome, loop state). Renaming or retagging a variant changes what
/// downstream log readers match on.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `#[derive(Serialize)]` is removed from an outcome type
/// - A serde attribute changes unit variants into tagged objects
#[test]
fn given_outcome_values_when_serialized_then_bare_variant_names() {
    // GIVEN / WHEN: One value of each outcome type serialized to JSON
    let acquire = serde_json::to_string(&AcquireOutcome::ReclaimedAbandoned)
        .expect("AcquireOutcome should serialize");
    let state = serde_json::to_string(&ActivationLoopState::Listening)
        .expect("ActivationLoopState should serialize");
    let notify =
        serde_json::to_string(&NotifyOutcome::NoListener).expect("NotifyOutcome should serialize");
    let activation = serde_json::to_string(&ActivationOutcome::Flashed)
        .expect("ActivationOutcome should serialize");

    // THEN: Each is a plain JSON string
    assert_eq!(acquire, "\"ReclaimedAbandoned\"");
    assert_eq!(state, "\"Listening\"");
    assert_eq!(notify, "\"NoListener\"");
    assert_eq!(activation, "\"Flashed\"");
}

/// **VALUE**: Verifies only `HeldElsewhere` means "another instance is running".
///
/// **WHY THIS MATTERS**: The gate fails open. Any other outcome, including an
/// acquisition error, must let the app start.
///
/// **BUG THIS CATCHES**: Would catch `FailedOpen` or `ReclaimedAbandoned` being
/// treated as a second instance, which would leave the user with no window.
#[test]
fn given_each_acquire_outcome_when_checked_then_only_held_elsewhere_forwards() {
    // GIVEN: Every acquisition outcome
    let outcomes = [
        (AcquireOutcome::CreatedNew, true),
        (AcquireOutcome::ReclaimedAbandoned, true),
        (AcquireOutcome::HeldElsewhere, false),
        (AcquireOutcome::FailedOpen, true),
    ];

    // WHEN / THEN: First-instance classification matches
    for (outcome, first) in outcomes {
        assert_eq!(outcome.is_first_instance(), first, "{outcome:?}");
    }
}
