//! Per-session state tracking
//!
//! Sessions are identified by the host-supplied id, else a SHA-256 digest of
//! the transcript path, else the literal `"unknown"`. Each session owns a
//! directory of small flag files under `~/.claudekit/sessions/<id>/`; absence
//! of a file means "default". Writes go through a temp-file + rename so a
//! crash mid-write never leaves a torn flag visible.
//!
//! The `"unknown"` session is ephemeral: reads return defaults and writes are
//! no-ops. Manual CLI runs and `profile` use it so benchmarking never
//! pollutes real host sessions.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};

use crate::constants::{DISABLED_HOOKS_FILE, SESSION_TTL, UNKNOWN_SESSION_ID};
use crate::path::sessions_dir;

/// Derive a stable session id from what the payload offers.
///
/// Priority: host `session_id`, then SHA-256 of the transcript path, then
/// `"unknown"`. Host ids are sanitized so they are always safe as a
/// directory name; an id that sanitizes to nothing falls through.
pub fn derive_session_id(session_id: Option<&str>, transcript_path: Option<&Path>) -> String {
    if let Some(id) = session_id {
        let sanitized: String = id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();
        if !sanitized.is_empty() {
            return sanitized;
        }
    }
    if let Some(path) = transcript_path {
        let digest = Sha256::digest(path.to_string_lossy().as_bytes());
        return digest.iter().map(|b| format!("{b:02x}")).collect();
    }
    UNKNOWN_SESSION_ID.to_string()
}

/// Handle on one session's flag directory.
pub struct SessionTracker {
    id: String,
    dir: PathBuf,
    ephemeral: bool,
}

impl SessionTracker {
    /// Open (or lazily create) the state directory for `id`.
    ///
    /// Opening also prunes expired sibling sessions, so long-gone state never
    /// outlives the 7-day TTL by more than one invocation.
    pub fn open(id: impl Into<String>) -> Self {
        let id = id.into();
        let ephemeral = id == UNKNOWN_SESSION_ID;
        let dir = sessions_dir().join(&id);
        let tracker = Self { id, dir, ephemeral };
        prune(SESSION_TTL);
        tracker
    }

    /// Open using payload-derived identity.
    pub fn from_payload(session_id: Option<&str>, transcript_path: Option<&Path>) -> Self {
        Self::open(derive_session_id(session_id, transcript_path))
    }

    /// The session id this tracker operates on.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether writes are discarded (the `"unknown"` session).
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Whether `hook_id` was disabled for this session.
    pub fn is_disabled(&self, hook_id: &str) -> bool {
        self.disabled_hooks().iter().any(|h| h == hook_id)
    }

    /// Add `hook_id` to the session's disabled set.
    pub fn disable(&self, hook_id: &str) {
        let mut disabled = self.disabled_hooks();
        if !disabled.iter().any(|h| h == hook_id) {
            disabled.push(hook_id.to_string());
            self.write_file(DISABLED_HOOKS_FILE, &(disabled.join("\n") + "\n"));
        }
    }

    /// Remove `hook_id` from the session's disabled set.
    pub fn enable(&self, hook_id: &str) {
        let disabled: Vec<String> = self
            .disabled_hooks()
            .into_iter()
            .filter(|h| h != hook_id)
            .collect();
        if disabled.is_empty() {
            let _ = std::fs::remove_file(self.dir.join(DISABLED_HOOKS_FILE));
        } else {
            self.write_file(DISABLED_HOOKS_FILE, &(disabled.join("\n") + "\n"));
        }
    }

    /// All hook ids disabled for this session.
    pub fn disabled_hooks(&self) -> Vec<String> {
        if self.ephemeral {
            return Vec::new();
        }
        std::fs::read_to_string(self.dir.join(DISABLED_HOOKS_FILE))
            .map(|raw| {
                raw.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Read a named flag; `None` means unset.
    pub fn get_flag(&self, name: &str) -> Option<String> {
        if self.ephemeral {
            return None;
        }
        std::fs::read_to_string(self.dir.join(Self::flag_file(name)))
            .ok()
            .map(|v| v.trim_end().to_string())
    }

    /// Convenience: flag set to the literal `true`.
    pub fn flag_is_true(&self, name: &str) -> bool {
        self.get_flag(name).as_deref() == Some("true")
    }

    /// Set a named flag. Failures are logged and swallowed: a flag that
    /// could not be persisted is effectively ephemeral, never fatal.
    pub fn set_flag(&self, name: &str, value: &str) {
        self.write_file(&Self::flag_file(name), &format!("{value}\n"));
    }

    fn flag_file(name: &str) -> String {
        format!("{name}.flag")
    }

    /// Atomic write: `<file>.tmp` in the same directory, then rename.
    fn write_file(&self, file: &str, content: &str) {
        if self.ephemeral {
            return;
        }
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!("cannot create session dir {}: {e}", self.dir.display());
            return;
        }
        let target = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        let result = std::fs::write(&tmp, content).and_then(|()| std::fs::rename(&tmp, &target));
        if let Err(e) = result {
            tracing::warn!("session flag write failed for {}: {e}", target.display());
            let _ = std::fs::remove_file(&tmp);
        }
    }
}

/// List known session ids, newest first.
pub fn list_sessions() -> Vec<String> {
    let mut entries: Vec<(SystemTime, String)> = std::fs::read_dir(sessions_dir())
        .map(|rd| {
            rd.flatten()
                .filter(|e| e.path().is_dir())
                .filter_map(|e| {
                    let mtime = e.metadata().and_then(|m| m.modified()).ok()?;
                    Some((mtime, e.file_name().to_string_lossy().into_owned()))
                })
                .collect()
        })
        .unwrap_or_default();
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    entries.into_iter().map(|(_, id)| id).collect()
}

/// The most recently touched session, if any.
pub fn most_recent_session() -> Option<String> {
    list_sessions().into_iter().next()
}

/// Remove session directories whose mtime is older than `older_than`.
pub fn prune(older_than: Duration) {
    let Ok(entries) = std::fs::read_dir(sessions_dir()) else {
        return;
    };
    let now = SystemTime::now();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let expired = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|mtime| now.duration_since(mtime).ok())
            .map(|age| age > older_than)
            .unwrap_or(false);
        if expired && let Err(e) = std::fs::remove_dir_all(&path) {
            tracing::warn!("failed to prune session {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_prefers_host_id() {
        let id = derive_session_id(Some("sess-123"), Some(Path::new("/tmp/t.jsonl")));
        assert_eq!(id, "sess-123");
    }

    #[test]
    fn test_derive_hashes_transcript_path() {
        let a = derive_session_id(None, Some(Path::new("/tmp/a.jsonl")));
        let b = derive_session_id(None, Some(Path::new("/tmp/b.jsonl")));
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(a, derive_session_id(None, Some(Path::new("/tmp/a.jsonl"))));
    }

    #[test]
    fn test_derive_falls_back_to_unknown() {
        assert_eq!(derive_session_id(None, None), UNKNOWN_SESSION_ID);
        // An id that sanitizes away entirely is as good as absent
        assert_eq!(derive_session_id(Some("../.."), None), UNKNOWN_SESSION_ID);
    }

    #[test]
    fn test_host_id_is_sanitized() {
        assert_eq!(derive_session_id(Some("a/b:c"), None), "abc");
    }

    #[test]
    fn test_unknown_session_is_ephemeral() {
        let tracker = SessionTracker::open(UNKNOWN_SESSION_ID);
        tracker.disable("check-any-changed");
        assert!(!tracker.is_disabled("check-any-changed"));
        tracker.set_flag("codebase-map-loaded", "true");
        assert!(tracker.get_flag("codebase-map-loaded").is_none());
    }
}
