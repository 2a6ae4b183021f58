use searchlight::shell::HeadlessShell;
use searchlight::startup::{StartupOutcome, run_instance};

use instance_core::config::InstanceConfig;
use instance_core::gate::InstanceGate;
use instance_core::ipc::NotifyOutcome;

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::sync::oneshot;
use uuid::Uuid;

// ============================================================================
// Integration tests for the startup decision
// These drive run_instance() with a headless shell, as two launches would
// ============================================================================

fn isolated_config() -> (InstanceConfig, TempDir) {
    let dir = TempDir::new().expect("Failed to create runtime dir");
    let id = format!("sl-{}", &Uuid::new_v4().simple().to_string()[..12]);
    let config = InstanceConfig::for_app(&id)
        .expect("Generated app id should be valid")
        .with_runtime_dir(dir.path())
        .with_connect_timeout(Duration::from_secs(1))
        .with_cleanup_timeout(Duration::from_secs(1));
    (config, dir)
}

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    condition()
}

/// **VALUE**: Verifies the full double-launch flow through `run_instance`.
///
/// **WHY THIS MATTERS**: This is the user scenario: start Searchlight, start
/// it again. The second launch must exit immediately and the first must see
/// exactly one activation, then shut down cleanly and free the gate.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The second launch runs a second primary instead of forwarding
/// - The primary never starts its activation server
/// - The gate stays held after the primary exits
#[test]
fn given_primary_running_when_second_launch_then_forwarded_and_primary_sees_one_activation() {
    // GIVEN: A primary instance running a headless shell until told to stop
    let (config, _dir) = isolated_config();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let (ready_tx, ready_rx) = oneshot::channel::<()>();
    let shell = HeadlessShell::until(async move {
        let _ = stop_rx.await;
    })
    .with_ready_signal(ready_tx);
    let activations = shell.activation_counter();

    let primary_config = config.clone();
    let primary = thread::spawn(move || run_instance(&primary_config, shell));
    ready_rx
        .blocking_recv()
        .expect("Primary exited before its server started");

    // WHEN: A second launch runs
    let second = run_instance(&config, HeadlessShell::until(async {}))
        .expect("Second launch should not error");

    // THEN: It forwarded and the primary saw exactly one activation
    assert_eq!(second, StartupOutcome::Forwarded(NotifyOutcome::Delivered));
    assert!(
        wait_until(Duration::from_secs(3), || activations.load(Ordering::SeqCst) == 1),
        "Primary should record one activation"
    );

    // WHEN: The primary is stopped
    stop_tx.send(()).expect("Primary stopped early");
    let primary = primary
        .join()
        .expect("Primary thread panicked")
        .expect("Primary should exit cleanly");

    // THEN: It reports Primary and the gate is free again
    assert_eq!(primary, StartupOutcome::Primary);
    let mut gate = InstanceGate::new(&config);
    assert!(gate.try_acquire(), "Gate should be free after shutdown");
}

/// **VALUE**: Verifies a lone launch runs as primary and returns when its
/// shell exits.
///
/// **BUG THIS CATCHES**: Would catch `run_instance` hanging in cleanup when
/// the server never received a connection.
#[test]
fn given_no_other_instance_when_launched_then_runs_as_primary() {
    // GIVEN: Nothing running
    let (config, _dir) = isolated_config();

    // WHEN: Launching with a shell that exits immediately
    let started = Instant::now();
    let outcome = run_instance(&config, HeadlessShell::until(async {}))
        .expect("Launch should not error");

    // THEN: Primary, and shutdown stayed within the cleanup bound
    assert_eq!(outcome, StartupOutcome::Primary);
    assert!(started.elapsed() < Duration::from_secs(3));
}
