use super::fakes::{
    FakeTarget, FakeWindowSystem, MAIN_WINDOW, OTHER_THREAD, SystemCall, UI_THREAD,
};
use crate::window::{ActivationOutcome, FLASH_COUNT, FlashFlags, ShowCommand, WindowActivator};

/// **VALUE**: Verifies a window minimized to the tray comes back to the normal
/// state even when the OS refuses to give it focus.
///
/// **WHY THIS MATTERS**: Restoring is the part of activation the user can always
/// see. If restore were skipped whenever foreground fails, a second launch from
/// a background process would do nothing visible at all.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Restore is made conditional on the foreground calls succeeding
/// - The `Restore` show command is never issued for minimized windows
#[test]
fn given_minimized_target_when_foreground_refused_then_target_restored_to_normal_state() {
    // GIVEN: A minimized, hidden window and a locked foreground
    let activator = WindowActivator::new(FakeWindowSystem::foreground_locked());
    let target = FakeTarget::minimized_to_tray();

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: The window is restored and visible, and the OS was asked to restore it
    assert_eq!(outcome, ActivationOutcome::Flashed);
    assert!(!target.minimized.get(), "Target should leave the minimized state");
    assert!(target.visible.get(), "Target should be visible");
    assert!(
        activator
            .system()
            .position(&SystemCall::ShowWindow(ShowCommand::Restore))
            .is_some(),
        "Restore show command should be issued"
    );
}

/// **VALUE**: Verifies the taskbar flag is set after activation.
///
/// **WHY THIS MATTERS**: A window hidden from the taskbar cannot be flashed, so
/// the fallback would be invisible too.
///
/// **BUG THIS CATCHES**: Would catch if `set_show_in_taskbar(true)` is dropped.
#[test]
fn given_target_hidden_from_taskbar_when_activated_then_shown_in_taskbar() {
    // GIVEN: A window not in the taskbar
    let activator = WindowActivator::new(FakeWindowSystem::foreground_granted());
    let target = FakeTarget::minimized_to_tray();

    // WHEN: Activating
    activator.activate(&target);

    // THEN: Taskbar flag is on
    assert!(target.show_in_taskbar.get());
}

/// **VALUE**: Verifies the flash fallback fires exactly once with the
/// documented flags and count when foreground is not obtained.
///
/// **WHY THIS MATTERS**: The flash is the only signal the user gets when the
/// OS blocks the window from coming forward.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The flash is skipped or repeated
/// - The flags lose `TIMER_NO_FOREGROUND` and flash forever
/// - The count drifts from 3
#[test]
fn given_foreground_refused_when_activated_then_flashes_once_with_all_and_timer_no_foreground() {
    // GIVEN: A locked foreground
    let activator = WindowActivator::new(FakeWindowSystem::foreground_locked());
    let target = FakeTarget::with_handle();

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: Exactly one flash with ALL | TIMER_NO_FOREGROUND and count 3
    assert_eq!(outcome, ActivationOutcome::Flashed);
    let flashes: Vec<_> = activator
        .system()
        .recorded()
        .into_iter()
        .filter(|c| matches!(c, SystemCall::Flash { .. }))
        .collect();
    assert_eq!(
        flashes,
        vec![SystemCall::Flash {
            flags: FlashFlags::ALL | FlashFlags::TIMER_NO_FOREGROUND,
            count: FLASH_COUNT,
        }]
    );
    assert_eq!(FLASH_COUNT, 3);
}

/// **VALUE**: Verifies no flash happens when the window does reach the front.
///
/// **BUG THIS CATCHES**: Would catch an unconditional flash, which would leave
/// the taskbar button blinking on every successful activation.
#[test]
fn given_foreground_granted_when_activated_then_foreground_without_flash() {
    // GIVEN: An OS that grants foreground
    let activator = WindowActivator::new(FakeWindowSystem::foreground_granted());
    let target = FakeTarget::with_handle();

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: Foreground, no flash, toolkit activation ran
    assert_eq!(outcome, ActivationOutcome::Foreground);
    assert_eq!(
        activator
            .system()
            .count(|c| matches!(c, SystemCall::Flash { .. })),
        0
    );
    assert!(target.activated.get());
    assert!(target.focused.get());
}

/// **VALUE**: Verifies thread input is attached around the foreground calls
/// and detached afterwards when another thread owns the foreground.
///
/// **WHY THIS MATTERS**: A leaked attachment ties our input queue to another
/// application's thread, which can freeze keyboard input for both.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The detach is missing
/// - The attach happens after `SetForegroundWindow`
/// - The detach happens before `SetFocus`
#[test]
fn given_foreground_on_other_thread_when_activated_then_attach_wraps_foreground_calls() {
    // GIVEN: Another thread owns the foreground
    let activator = WindowActivator::new(FakeWindowSystem::foreground_locked());
    let target = FakeTarget::with_handle();

    // WHEN: Activating
    activator.activate(&target);

    // THEN: Attach, the four foreground calls, detach, in that order
    let system = activator.system();
    let attach = SystemCall::Attach {
        from: UI_THREAD,
        to: OTHER_THREAD,
    };
    let detach = SystemCall::Detach {
        from: UI_THREAD,
        to: OTHER_THREAD,
    };
    let attach_at = system.position(&attach).expect("should attach");
    let detach_at = system.position(&detach).expect("should detach");
    let foreground_at = system
        .position(&SystemCall::SetForeground)
        .expect("should call SetForegroundWindow");
    let focus_at = system
        .position(&SystemCall::SetFocus)
        .expect("should call SetFocus");

    assert!(attach_at < foreground_at);
    assert!(focus_at < detach_at);
    assert_eq!(system.count(|c| *c == attach), 1);
    assert_eq!(system.count(|c| *c == detach), 1);
}

/// **VALUE**: Verifies the detach still happens when every foreground call fails.
///
/// **WHY THIS MATTERS**: Failures are the common case under the foreground lock.
/// The attachment must not survive them.
///
/// **BUG THIS CATCHES**: Would catch an early return on the first failing call
/// that skips the detach.
#[test]
fn given_failing_foreground_calls_when_activated_then_input_still_detached() {
    // GIVEN: Every foreground call fails
    let system = FakeWindowSystem {
        fail_foreground_calls: true,
        ..FakeWindowSystem::foreground_locked()
    };
    let activator = WindowActivator::new(system);
    let target = FakeTarget::with_handle();

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: All four calls were attempted, detach ran, fallback flashed
    let system = activator.system();
    assert_eq!(outcome, ActivationOutcome::Flashed);
    for call in [
        SystemCall::BringToTop,
        SystemCall::SetForeground,
        SystemCall::SetActive,
        SystemCall::SetFocus,
    ] {
        assert_eq!(system.count(|c| *c == call), 1, "{call:?} should be attempted");
    }
    assert_eq!(
        system.count(|c| matches!(c, SystemCall::Detach { .. })),
        1,
        "Detach should pair the attach"
    );
}

/// **VALUE**: Verifies no attach happens when the UI thread already owns the
/// foreground.
///
/// **BUG THIS CATCHES**: Would catch attaching a thread to itself, which the
/// OS rejects.
#[test]
fn given_foreground_on_own_thread_when_activated_then_no_attach() {
    // GIVEN: Our own window is in front
    let system = FakeWindowSystem::foreground_granted();
    system.foreground.set(Some(MAIN_WINDOW));
    let activator = WindowActivator::new(system);
    let target = FakeTarget::with_handle();

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: Foreground calls issued without attaching
    let system = activator.system();
    assert_eq!(outcome, ActivationOutcome::Foreground);
    assert_eq!(
        system.count(|c| matches!(c, SystemCall::Attach { .. } | SystemCall::Detach { .. })),
        0
    );
    assert_eq!(system.count(|c| *c == SystemCall::SetForeground), 1);
}

/// **VALUE**: Verifies activation carries on when there is no foreground window.
///
/// **BUG THIS CATCHES**: Would catch treating a missing foreground window as
/// a reason to skip the foreground calls.
#[test]
fn given_no_foreground_window_when_activated_then_foreground_calls_issued_without_attach() {
    // GIVEN: Nothing is in front
    let system = FakeWindowSystem::foreground_granted();
    system.foreground.set(None);
    let activator = WindowActivator::new(system);
    let target = FakeTarget::with_handle();

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: Window takes the foreground
    assert_eq!(outcome, ActivationOutcome::Foreground);
    assert_eq!(
        activator
            .system()
            .count(|c| matches!(c, SystemCall::Attach { .. })),
        0
    );
}

/// **VALUE**: Verifies an iconic window is restored even when the toolkit
/// thinks it is not minimized.
///
/// **WHY THIS MATTERS**: Toolkit state and OS state can disagree, for example
/// after the user minimizes with Win+D.
///
/// **BUG THIS CATCHES**: Would catch consulting only the toolkit flag.
#[test]
fn given_os_iconic_window_when_activated_then_restore_issued() {
    // GIVEN: The OS reports the window iconic, the toolkit does not
    let system = FakeWindowSystem::foreground_granted();
    system.iconic.set(true);
    let activator = WindowActivator::new(system);
    let target = FakeTarget::with_handle();

    // WHEN: Activating
    activator.activate(&target);

    // THEN: Restore was issued
    assert_eq!(
        activator
            .system()
            .count(|c| *c == SystemCall::ShowWindow(ShowCommand::Restore)),
        1
    );
}

/// **VALUE**: Verifies a window without a handle gets one created before
/// activation proceeds.
///
/// **WHY THIS MATTERS**: A window that was never shown has no native handle;
/// without forcing creation the second launch would be silently ignored.
///
/// **BUG THIS CATCHES**: Would catch returning `NoHandle` without trying
/// `ensure_handle` first.
#[test]
fn given_target_without_handle_when_activated_then_handle_created_and_activated() {
    // GIVEN: A target whose handle appears only after ensure_handle
    let activator = WindowActivator::new(FakeWindowSystem::foreground_granted());
    let target = FakeTarget::with_handle();
    target.handle.set(None);

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: Handle was forced and activation ran
    assert_eq!(target.ensure_calls.get(), 1);
    assert_eq!(outcome, ActivationOutcome::Foreground);
}

/// **VALUE**: Verifies activation stops cleanly if no handle can be created.
///
/// **BUG THIS CATCHES**: Would catch OS calls being issued with a null handle.
#[test]
fn given_target_that_never_gets_handle_when_activated_then_no_handle_and_no_os_calls() {
    // GIVEN: A target that never produces a handle
    let activator = WindowActivator::new(FakeWindowSystem::foreground_granted());
    let target = FakeTarget {
        handle_after_ensure: None,
        ..FakeTarget::with_handle()
    };
    target.handle.set(None);

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: Nothing was sent to the OS
    assert_eq!(outcome, ActivationOutcome::NoHandle);
    assert!(activator.system().recorded().is_empty());
    assert!(!target.activated.get());
}

/// **VALUE**: Verifies every step runs even when all toolkit calls fail.
///
/// **BUG THIS CATCHES**: Would catch `?` propagation inside the sequence,
/// which would abort at the first failing toolkit call.
#[test]
fn given_failing_toolkit_calls_when_activated_then_sequence_completes() {
    // GIVEN: Toolkit calls that all fail
    let activator = WindowActivator::new(FakeWindowSystem::foreground_locked());
    let target = FakeTarget {
        fail_toolkit_calls: true,
        ..FakeTarget::minimized_to_tray()
    };

    // WHEN: Activating
    let outcome = activator.activate(&target);

    // THEN: Later steps still ran
    assert_eq!(outcome, ActivationOutcome::Flashed);
    assert!(target.activated.get());
    assert!(target.focused.get());
    assert_eq!(
        activator
            .system()
            .count(|c| *c == SystemCall::ShowWindow(ShowCommand::ShowNormal)),
        1
    );
}
