use crate::helpers::isolated_config;

use instance_core::config::InstanceConfig;
use instance_core::gate::{AcquireOutcome, InstanceGate};

use std::thread;

#[cfg(unix)]
use std::fs::{self, OpenOptions};
#[cfg(unix)]
use std::path::PathBuf;

// ============================================================================
// InstanceGate public API
// ============================================================================

/// Acquire a gate on a separate OS thread and report what it saw.
///
/// Named mutexes are recursive per thread on Windows, so a second "instance"
/// has to try from another thread to observe contention.
fn acquire_elsewhere(config: &InstanceConfig) -> (bool, Option<AcquireOutcome>) {
    let config = config.clone();
    thread::spawn(move || {
        let mut gate = InstanceGate::new(&config);
        let acquired = gate.try_acquire();
        (acquired, gate.outcome())
    })
    .join()
    .expect("Gate thread panicked")
}

/// **VALUE**: Verifies at most one gate holds the primitive at a time.
///
/// **WHY THIS MATTERS**: This is the whole point of the gate. Two holders
/// means two running instances fighting over the activation channel.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The lock is not exclusive
/// - A held primitive is reported as abandoned and reclaimed
#[test]
fn given_held_gate_when_second_gate_acquires_then_returns_false() {
    // GIVEN: A gate that holds the primitive
    let (config, _dir) = isolated_config();
    let mut first = InstanceGate::new(&config);
    assert!(first.try_acquire(), "First gate should acquire");
    assert_eq!(first.outcome(), Some(AcquireOutcome::CreatedNew));
    assert!(first.is_held());

    // WHEN: A second gate tries the same name
    let (acquired, outcome) = acquire_elsewhere(&config);

    // THEN: Second gate is told another instance is running
    assert!(!acquired, "Second gate must not acquire a held primitive");
    assert_eq!(outcome, Some(AcquireOutcome::HeldElsewhere));
}

/// **VALUE**: Verifies the primitive can be taken again after release.
///
/// **WHY THIS MATTERS**: After the first instance exits, the next launch must
/// become the new first instance rather than forwarding into the void.
///
/// **BUG THIS CATCHES**: Would catch `release()` leaving the primitive held.
#[test]
fn given_released_gate_when_new_gate_acquires_then_returns_true() {
    // GIVEN: A gate that acquired then released
    let (config, _dir) = isolated_config();
    let mut first = InstanceGate::new(&config);
    assert!(first.try_acquire());
    first.release();
    assert!(!first.is_held());

    // WHEN: A new gate acquires
    let (acquired, outcome) = acquire_elsewhere(&config);

    // THEN: It becomes the first instance
    assert!(acquired);
    assert_eq!(outcome, Some(AcquireOutcome::CreatedNew));
}

/// **VALUE**: Verifies dropping a gate releases it.
///
/// **BUG THIS CATCHES**: Would catch a missing `Drop` impl, which would leave
/// the primitive held until process exit after an early return.
#[test]
fn given_dropped_gate_when_new_gate_acquires_then_returns_true() {
    // GIVEN: A gate that acquired and was dropped
    let (config, _dir) = isolated_config();
    {
        let mut first = InstanceGate::new(&config);
        assert!(first.try_acquire());
    }

    // WHEN / THEN: Another gate acquires
    let (acquired, _) = acquire_elsewhere(&config);
    assert!(acquired);
}

/// **VALUE**: Verifies re-acquiring a held gate and double release are harmless.
///
/// **BUG THIS CATCHES**: Would catch a second `try_acquire` contending with
/// itself, or a double release touching the OS twice.
#[test]
fn given_held_gate_when_acquired_again_and_released_twice_then_no_error() {
    // GIVEN: A held gate
    let (config, _dir) = isolated_config();
    let mut gate = InstanceGate::new(&config);
    assert!(gate.try_acquire());

    // WHEN: Acquiring again and releasing twice
    let again = gate.try_acquire();
    gate.release();
    gate.release();

    // THEN: Second acquire was a no-op success; gate ends released
    assert!(again);
    assert!(!gate.is_held());
}

/// **VALUE**: Verifies a lock file left by a crashed instance is reclaimed.
///
/// **WHY THIS MATTERS**: A crash skips cleanup. The next launch must start
/// normally rather than forward to a process that no longer exists.
///
/// **BUG THIS CATCHES**: Would catch treating the existence of the file as
/// "held" instead of checking the lock, or ignoring the pid a crashed owner
/// left behind.
#[cfg(unix)]
#[test]
fn given_stale_lock_file_when_gate_acquires_then_reclaims_abandoned() {
    // GIVEN: A lock file nobody holds
    let (config, dir) = isolated_config();
    let stale = dir
        .path()
        .join(format!("{}.lock", config.gate_name().to_ascii_lowercase()));
    std::fs::write(&stale, "99999").expect("Failed to write stale lock file");

    // WHEN: A gate acquires
    let mut gate = InstanceGate::new(&config);
    let acquired = gate.try_acquire();

    // THEN: Acquired, reported as reclaimed
    assert!(acquired, "Stale lock must not block startup");
    assert_eq!(gate.outcome(), Some(AcquireOutcome::ReclaimedAbandoned));
    assert!(gate.is_held());
}

/// Where the Unix gate keeps its lock file for `config`.
#[cfg(unix)]
fn lock_path(config: &InstanceConfig) -> PathBuf {
    config
        .runtime_dir()
        .join(format!("{}.lock", config.gate_name().to_ascii_lowercase()))
}

/// **VALUE**: Verifies a clean release keeps the lock file and empties it.
///
/// **WHY THIS MATTERS**: Content is how the next launch tells a clean exit
/// from a crash. A released gate must not look abandoned.
///
/// **BUG THIS CATCHES**: Would catch release leaving the pid behind, which
/// turns every normal restart into a reclaim.
#[cfg(unix)]
#[test]
fn given_released_gate_when_lock_file_inspected_then_kept_and_empty() {
    // GIVEN: A gate that acquired and released
    let (config, _dir) = isolated_config();
    let mut gate = InstanceGate::new(&config);
    assert!(gate.try_acquire());
    let path = lock_path(&config);
    let held_contents = fs::read_to_string(&path).expect("Failed to read lock file");
    assert_eq!(held_contents, std::process::id().to_string());

    // WHEN: Releasing
    gate.release();

    // THEN: The file is still there, with nothing in it
    let released = fs::metadata(&path).expect("Lock file should survive release");
    assert_eq!(released.len(), 0, "Clean release must empty the lock file");
}

/// **VALUE**: Verifies a launch that opened the lock file before the owner
/// released still contends with every later launch.
///
/// **WHY THIS MATTERS**: Launches race. One may open the lock file just before
/// the first instance exits, then lock it just after. A fresh launch arriving
/// then must see that lock, not a new file of its own.
///
/// **BUG THIS CATCHES**: Would catch release unlinking the lock file, which
/// lets the early opener and the fresh launch lock different inodes and both
/// run as first instance.
#[cfg(unix)]
#[test]
fn given_lock_file_opened_before_release_when_fresh_gate_acquires_then_only_one_holds() {
    // GIVEN: A held gate, and a second opener that got the file before release
    let (config, _dir) = isolated_config();
    let mut first = InstanceGate::new(&config);
    assert!(first.try_acquire());
    let early = OpenOptions::new()
        .read(true)
        .write(true)
        .open(lock_path(&config))
        .expect("Failed to open lock file");

    // WHEN: The owner releases, the early opener locks, and a fresh gate tries
    first.release();
    early
        .try_lock()
        .expect("Early opener should lock the released file");
    let (acquired, outcome) = acquire_elsewhere(&config);

    // THEN: The fresh gate sees the early opener's lock
    assert!(!acquired, "Two holders of the instance gate");
    assert_eq!(outcome, Some(AcquireOutcome::HeldElsewhere));
}

/// **VALUE**: Verifies a mutex whose owner died without releasing is reclaimed.
///
/// **WHY THIS MATTERS**: A crashed first instance leaves the named mutex
/// abandoned. The next launch must take it over and say so.
///
/// **BUG THIS CATCHES**: Would catch `WAIT_ABANDONED` being treated as
/// "held elsewhere" or as a plain fresh acquisition.
#[cfg(windows)]
#[test]
fn given_owner_thread_exited_without_release_when_gate_acquires_then_reclaims_abandoned() {
    // GIVEN: A thread that acquires the gate and exits without releasing
    let (config, _dir) = isolated_config();
    let owner_config = config.clone();
    thread::spawn(move || {
        let mut gate = InstanceGate::new(&owner_config);
        assert!(gate.try_acquire(), "Owner thread should acquire");
        // Skips Drop, so the mutex is never released by its owner.
        std::mem::forget(gate);
    })
    .join()
    .expect("Owner thread panicked");

    // WHEN: Another thread acquires
    let (acquired, outcome) = acquire_elsewhere(&config);

    // THEN: Acquired, reported as reclaimed
    assert!(acquired, "Abandoned mutex must not block startup");
    assert_eq!(outcome, Some(AcquireOutcome::ReclaimedAbandoned));
}

/// **VALUE**: Verifies an unusable runtime directory fails open.
///
/// **WHY THIS MATTERS**: A broken gate must never stop the app from starting.
///
/// **BUG THIS CATCHES**: Would catch an acquisition error being reported as
/// "another instance is running".
#[cfg(unix)]
#[test]
fn given_unusable_runtime_dir_when_gate_acquires_then_fails_open() {
    // GIVEN: A runtime "dir" that is actually a file
    let (config, dir) = isolated_config();
    let not_a_dir = dir.path().join("occupied");
    std::fs::write(&not_a_dir, "").expect("Failed to create blocking file");
    let config = config.with_runtime_dir(&not_a_dir);

    // WHEN: A gate acquires
    let mut gate = InstanceGate::new(&config);
    let acquired = gate.try_acquire();

    // THEN: Treated as first instance, nothing held
    assert!(acquired);
    assert_eq!(gate.outcome(), Some(AcquireOutcome::FailedOpen));
    assert!(!gate.is_held());
}
