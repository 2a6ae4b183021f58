use super::fakes::{FakeWindowSystem, OTHER_THREAD, SystemCall, UI_THREAD};
use crate::window::ThreadInputGuard;

/// **VALUE**: Verifies the guard detaches exactly once when dropped.
///
/// **BUG THIS CATCHES**: Would catch a guard whose Drop never detaches.
#[test]
fn given_attached_guard_when_dropped_then_detaches_once() {
    // GIVEN: An attached guard
    let system = FakeWindowSystem::foreground_locked();
    let guard = ThreadInputGuard::attach(&system, UI_THREAD, OTHER_THREAD);
    assert!(guard.is_attached());

    // WHEN: Dropping it
    drop(guard);

    // THEN: Attach then detach
    assert_eq!(
        system.recorded(),
        vec![
            SystemCall::Attach {
                from: UI_THREAD,
                to: OTHER_THREAD
            },
            SystemCall::Detach {
                from: UI_THREAD,
                to: OTHER_THREAD
            },
        ]
    );
}

/// **VALUE**: Verifies a failed attach is not followed by a detach.
///
/// **BUG THIS CATCHES**: Would catch detaching input that was never attached.
#[test]
fn given_failed_attach_when_guard_dropped_then_no_detach() {
    // GIVEN: An OS that rejects the attach
    let system = FakeWindowSystem {
        fail_attach: true,
        ..FakeWindowSystem::foreground_locked()
    };

    // WHEN: Attaching and dropping
    let guard = ThreadInputGuard::attach(&system, UI_THREAD, OTHER_THREAD);
    assert!(!guard.is_attached());
    drop(guard);

    // THEN: No detach recorded
    assert_eq!(
        system.count(|c| matches!(c, SystemCall::Detach { .. })),
        0
    );
}
