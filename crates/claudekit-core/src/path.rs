//! Path utilities: claudekit home resolution, tilde expansion, lexical
//! normalization, and project-root discovery.
//!
//! All guard decisions and session-state writes flow through these helpers so
//! the `CLAUDEKIT_HOME` override and the normalization rules apply uniformly.

use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_HOME_DIR, HOME_ENV_VAR, LOGS_DIR_NAME, PROJECT_CONFIG_DIR,
    SESSIONS_DIR_NAME,
};

/// Resolve the claudekit data root.
///
/// `CLAUDEKIT_HOME` wins when set (tests and CI point it at a sandbox);
/// otherwise `~/.claudekit`. Falls back to a relative `.claudekit` when no
/// home directory can be determined.
pub fn claudekit_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV_VAR)
        && !home.is_empty()
    {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_HOME_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HOME_DIR))
}

/// Per-session state directory root: `<home>/sessions`
pub fn sessions_dir() -> PathBuf {
    claudekit_home().join(SESSIONS_DIR_NAME)
}

/// Execution log directory: `<home>/logs`
pub fn logs_dir() -> PathBuf {
    claudekit_home().join(LOGS_DIR_NAME)
}

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Other `~user` forms are returned unchanged; the guard treats them as
/// opaque (and therefore not project-relative).
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Lexically normalize a path without touching the filesystem.
///
/// `..` components are resolved textually; symlinks are not followed. Guard
/// decisions need to classify paths that may not exist yet, so this never
/// fails on missing files.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.clean()
}

/// Canonicalize when possible, falling back to lexical normalization.
///
/// Uses `dunce` so Windows results stay in legacy (non-UNC) form.
pub fn safe_canonicalize(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| normalize_path(path))
}

/// Check whether a path still contains upward traversal after normalization.
pub fn has_traversal(path: &Path) -> bool {
    normalize_path(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

/// Walk up from `start` looking for `.claudekit/config.json`.
///
/// Returns the directory containing `.claudekit`, or `None` when no project
/// configuration exists anywhere above `start`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = safe_canonicalize(start);
    loop {
        if dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE_NAME).is_file() {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Project root used by guard decisions: the configured project if one is
/// found above `cwd`, otherwise `cwd` itself.
pub fn resolve_project_root(cwd: &Path) -> PathBuf {
    find_project_root(cwd).unwrap_or_else(|| safe_canonicalize(cwd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_resolves_dot_segments() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
    }

    #[test]
    fn test_has_traversal_after_normalization() {
        assert!(has_traversal(Path::new("../outside")));
        assert!(has_traversal(Path::new("a/../../outside")));
        assert!(!has_traversal(Path::new("a/../b")));
        assert!(!has_traversal(Path::new("/a/b/../c")));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("rel/path"), PathBuf::from("rel/path"));
    }

    #[test]
    fn test_expand_tilde_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/x"), home.join("x"));
        }
    }

    #[test]
    fn test_claudekit_home_env_override() {
        // Env mutation is process-global; restore afterwards.
        let prev = std::env::var_os(HOME_ENV_VAR);
        unsafe { std::env::set_var(HOME_ENV_VAR, "/tmp/ck-test-home") };
        assert_eq!(claudekit_home(), PathBuf::from("/tmp/ck-test-home"));
        assert_eq!(
            sessions_dir(),
            PathBuf::from("/tmp/ck-test-home/sessions")
        );
        match prev {
            Some(v) => unsafe { std::env::set_var(HOME_ENV_VAR, v) },
            None => unsafe { std::env::remove_var(HOME_ENV_VAR) },
        }
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let tmp = std::env::temp_dir().join(format!("ck-root-{}", std::process::id()));
        let nested = tmp.join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir_all(tmp.join(PROJECT_CONFIG_DIR)).unwrap();
        std::fs::write(
            tmp.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE_NAME),
            "{}",
        )
        .unwrap();

        let found = find_project_root(&nested).unwrap();
        assert_eq!(found, safe_canonicalize(&tmp));

        std::fs::remove_dir_all(&tmp).ok();
    }
}
