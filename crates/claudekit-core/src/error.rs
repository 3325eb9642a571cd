//! Error handling for the claudekit hook engine
//!
//! Comprehensive error types with thiserror, exit code mappings, and the
//! failure taxonomy the host contract depends on: blocking decisions exit 2,
//! internal defects exit 1, everything else exits 0.

use thiserror::Error;

/// Convenient result alias for hook-engine operations.
pub type Result<T> = std::result::Result<T, HookError>;
/// Result specialized for configuration-related operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Root error type for all hook-engine operations.
///
/// Variants cover configuration, session state, transcripts, the file guard,
/// git, JSON/IO processing, input validation, timeouts, explicit blocking,
/// and contextual wrapping.
///
/// # Exit Code Mapping
///
/// - `Blocking` maps to [`ExitCode::BlockingError`] (2) — the host surfaces
///   the message to the model
/// - Everything else maps to [`ExitCode::GeneralError`] (1) — engine defects
///   are never reported as blocks
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    #[error("File guard error: {0}")]
    Guard(#[from] GuardError),

    #[error("Git operation failed: {0}")]
    Git(#[from] GitError),

    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout: {operation} took longer than {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Blocking error: {reason}")]
    Blocking { reason: String },

    /// Wraps arbitrary errors from external libraries
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Standard exit codes of the host hook contract.
///
/// Use [`ExitCode::from`] with a reference to [`HookError`] to consistently
/// map errors to process exit codes.
///
/// # Examples
/// ```
/// use claudekit_core::error::{HookError, ExitCode};
/// let err = HookError::Blocking { reason: "tests failed".into() };
/// let code: ExitCode = (&err).into();
/// assert_eq!(code, ExitCode::BlockingError);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Pass or skip; the host proceeds untouched
    Success = 0,
    /// Internal engine failure; never surfaced to the model as a block
    GeneralError = 1,
    /// Blocking decision; the host shows stderr to the model
    BlockingError = 2,
}

impl ExitCode {
    /// Raw process exit code
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl From<&HookError> for ExitCode {
    fn from(error: &HookError) -> Self {
        match error {
            HookError::Blocking { .. } => ExitCode::BlockingError,
            _ => ExitCode::GeneralError,
        }
    }
}

// Domain-specific error types with structured information

/// Configuration-related errors with specific variants
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Session-state management errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {id}")]
    NotFound { id: String },

    #[error("Invalid session id: {id}")]
    InvalidId { id: String },

    #[error("Session state write failed: {reason}")]
    WriteFailed { reason: String },

    #[error("{0}")]
    Other(String),
}

/// Transcript parsing errors
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Transcript not found: {path}")]
    NotFound { path: String },

    #[error("Transcript too large: {size} bytes exceeds cap of {cap} bytes")]
    TooLarge { size: u64, cap: u64 },

    #[error("{0}")]
    Other(String),
}

/// File-guard errors
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Path traversal escapes project root: {path}")]
    TraversalEscape { path: String },

    #[error("{0}")]
    Other(String),
}

/// Git subprocess errors (create-checkpoint)
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_maps_to_exit_2() {
        let err = HookError::Blocking {
            reason: "lint errors".into(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::BlockingError);
        assert_eq!(ExitCode::from(&err).code(), 2);
    }

    #[test]
    fn test_internal_errors_never_map_to_exit_2() {
        let errors = vec![
            HookError::InvalidInput {
                message: "bad".into(),
            },
            HookError::Timeout {
                operation: "tsc".into(),
                timeout_ms: 30_000,
            },
            HookError::Config(ConfigError::InvalidFormat {
                reason: "not json".into(),
            }),
            HookError::Git(GitError::NotARepository),
            HookError::Internal(anyhow::anyhow!("boom")),
        ];
        for err in &errors {
            assert_eq!(
                ExitCode::from(err),
                ExitCode::GeneralError,
                "{err} must not exit 2"
            );
        }
    }

    #[test]
    fn test_error_display_is_actionable() {
        let err = HookError::Timeout {
            operation: "npm test".into(),
            timeout_ms: 55_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("npm test"));
        assert!(msg.contains("55000"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: HookError = SessionError::NotFound { id: "abc".into() }.into();
        assert!(matches!(err, HookError::Session(_)));
        assert_eq!(ExitCode::from(&err), ExitCode::GeneralError);
    }
}
