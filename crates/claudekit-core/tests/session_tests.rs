//! Session tracker integration tests (real filesystem I/O).
//!
//! `CLAUDEKIT_HOME` is pinned to a per-process sandbox before the first
//! session access; tests share the sandbox but use distinct session ids.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use once_cell::sync::Lazy;

use claudekit_core::constants::HOME_ENV_VAR;
use claudekit_core::session::{SessionTracker, list_sessions, prune};

static SANDBOX: Lazy<std::path::PathBuf> = Lazy::new(|| {
    let dir = std::env::temp_dir().join(format!("ck-session-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create sandbox");
    unsafe { std::env::set_var(HOME_ENV_VAR, &dir) };
    dir
});

// The prune test wipes the shared sandbox; serialize every test here.
static LOCK: Mutex<()> = Mutex::new(());

fn guard() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn tracker(id: &str) -> SessionTracker {
    Lazy::force(&SANDBOX);
    SessionTracker::open(id)
}

#[test]
fn disable_enable_roundtrip() {
    let _serialized = guard();
    let t = tracker("sess-roundtrip");
    assert!(!t.is_disabled("check-any-changed"));

    t.disable("check-any-changed");
    t.disable("self-review");
    assert!(t.is_disabled("check-any-changed"));
    assert!(t.is_disabled("self-review"));

    // A fresh tracker over the same directory sees persisted state
    let again = tracker("sess-roundtrip");
    assert!(again.is_disabled("check-any-changed"));

    again.enable("check-any-changed");
    assert!(!again.is_disabled("check-any-changed"));
    assert!(again.is_disabled("self-review"));
}

#[test]
fn disable_is_idempotent() {
    let _serialized = guard();
    let t = tracker("sess-idempotent");
    t.disable("check-todos");
    t.disable("check-todos");
    assert_eq!(
        t.disabled_hooks()
            .iter()
            .filter(|h| h.as_str() == "check-todos")
            .count(),
        1
    );
}

#[test]
fn flags_roundtrip_and_default_to_none() {
    let _serialized = guard();
    let t = tracker("sess-flags");
    assert!(t.get_flag("codebase-map-loaded").is_none());
    assert!(!t.flag_is_true("codebase-map-loaded"));

    t.set_flag("codebase-map-loaded", "true");
    assert_eq!(t.get_flag("codebase-map-loaded").as_deref(), Some("true"));
    assert!(t.flag_is_true("codebase-map-loaded"));

    t.set_flag("codebase-map-loaded", "false");
    assert!(!t.flag_is_true("codebase-map-loaded"));
}

#[test]
fn writes_never_leave_temp_files_visible() {
    let _serialized = guard();
    let t = tracker("sess-atomic");
    for i in 0..50 {
        t.set_flag("counter", &i.to_string());
    }
    let dir = SANDBOX.join("sessions/sess-atomic");
    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "tmp files visible: {leftovers:?}");
    assert_eq!(t.get_flag("counter").as_deref(), Some("49"));
}

#[test]
fn list_sessions_sees_created_dirs() {
    let _serialized = guard();
    let t = tracker("sess-listed");
    t.set_flag("probe", "1");
    assert!(list_sessions().contains(&"sess-listed".to_string()));
}

#[test]
fn prune_removes_only_expired_sessions() {
    let _serialized = guard();
    let t = tracker("sess-fresh");
    t.set_flag("keep", "1");

    // Zero TTL prunes everything that exists
    let stale = tracker("sess-stale");
    stale.set_flag("gone", "1");
    prune(Duration::ZERO);
    assert!(!list_sessions().contains(&"sess-stale".to_string()));

    // Re-create and verify a generous TTL keeps it
    let t = tracker("sess-fresh");
    t.set_flag("keep", "1");
    prune(Duration::from_secs(7 * 24 * 60 * 60));
    assert!(list_sessions().contains(&"sess-fresh".to_string()));
}
