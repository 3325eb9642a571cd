//! System-wide constants for the claudekit hook engine
//!
//! Centralizes limits, timeouts, directory names, and naming conventions in
//! one place so the budget numbers of the host contract (stdin cap, injection
//! cap, the 60 s host ceiling) are never scattered as magic numbers.

use std::time::Duration;

// =============================================================================
// Directory Structure Constants
// =============================================================================

/// Root data directory under the user's home: `~/.claudekit`
///
/// Session flags and execution logs live here. Overridable through the
/// `CLAUDEKIT_HOME` environment variable (see [`crate::path::claudekit_home`]).
pub const DEFAULT_HOME_DIR: &str = ".claudekit";

/// Environment variable overriding the claudekit home directory
pub const HOME_ENV_VAR: &str = "CLAUDEKIT_HOME";

/// Per-session state directory name inside the home dir
pub const SESSIONS_DIR_NAME: &str = "sessions";

/// Execution log directory name inside the home dir
pub const LOGS_DIR_NAME: &str = "logs";

/// Project-local configuration directory
pub const PROJECT_CONFIG_DIR: &str = ".claudekit";

/// Project-local configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Session flag file holding the set of disabled hook ids
pub const DISABLED_HOOKS_FILE: &str = "disabled-hooks";

/// Environment variable enabling verbose stderr diagnostics
pub const DEBUG_ENV_VAR: &str = "DEBUG";

// =============================================================================
// Input / Output Budgets
// =============================================================================

/// Maximum JSON payload accepted on stdin (1 MiB)
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Idle timeout for a single stdin read operation
pub const STDIN_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Total budget for reading and parsing the stdin payload
pub const STDIN_TOTAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum characters injected as `additionalContext`
///
/// The host truncates longer context; truncating here keeps the boundary
/// explicit and lets `profile` warn before the host does.
pub const MAX_INJECTION_CHARS: usize = 9_000;

/// Maximum bytes written to stdout/stderr per invocation (10 MiB)
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Maximum captured bytes per subprocess stream before truncation
pub const MAX_CAPTURE_BYTES: usize = MAX_OUTPUT_BYTES;

/// Maximum transcript file size read by the parser (32 MiB)
pub const MAX_TRANSCRIPT_BYTES: u64 = 32 * 1024 * 1024;

// =============================================================================
// Timeouts
// =============================================================================

/// Default per-hook subprocess timeout
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceiling for project-wide test runs, below the host's 60 s hook ceiling
pub const PROJECT_TEST_TIMEOUT: Duration = Duration::from_secs(55);

/// Grace period between SIGTERM and SIGKILL on subprocess timeout
pub const KILL_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Configured timeouts are clamped into this range (seconds)
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Upper clamp for configured timeouts (seconds)
pub const MAX_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Session State
// =============================================================================

/// Session directories older than this are pruned on access
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Session id used for manual CLI runs and profiling; reads return defaults
/// and writes are no-ops
pub const UNKNOWN_SESSION_ID: &str = "unknown";

// =============================================================================
// Hook Policy Defaults
// =============================================================================

/// Default stash-message prefix for create-checkpoint
pub const CHECKPOINT_PREFIX: &str = "claude-checkpoint:";

/// Default cap on retained checkpoints
pub const DEFAULT_MAX_CHECKPOINTS: usize = 10;

/// Marker emitted (and later searched for) by self-review
pub const SELF_REVIEW_MARKER: &str = "📋 **Self-Review**";

/// Bounded lookback (in transcript records) when no self-review marker exists
pub const SELF_REVIEW_LOOKBACK: usize = 200;

/// Session flag recording that the codebase map was injected
pub const CODEBASE_MAP_FLAG: &str = "codebase-map-loaded";

/// AI-ignore files consulted at the project root, in merge order
pub const AI_IGNORE_FILES: &[&str] = &[
    ".agentignore",
    ".aiignore",
    ".aiexclude",
    ".geminiignore",
    ".codeiumignore",
    ".cursorignore",
];

// =============================================================================
// Profiling Thresholds
// =============================================================================

/// Wall-time above which `profile` flags a hook as slow
pub const PROFILE_SLOW_THRESHOLD: Duration = Duration::from_secs(5);
