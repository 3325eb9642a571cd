//! Core types and logic for the claudekit hook engine
//!
//! This crate provides the foundations every other component depends on:
//! error taxonomy and exit codes, hook-event types, configuration
//! resolution, per-session state, transcript parsing, the execution log,
//! and the file-guard sub-engine.
//!
//! Nothing here touches stdin/stdout or knows about the CLI; the `hooks`
//! binary wires these pieces to the host protocol.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod execlog;
pub mod guard;
pub mod path;
pub mod session;
pub mod transcript;

// Re-export the types nearly every caller needs
pub use error::{
    ConfigError, ExitCode, GitError, GuardError, HookError, Result, SessionError, TranscriptError,
};
pub use events::HookEvent;
pub use execlog::{ExecutionLog, ExecutionLogEntry};
pub use session::SessionTracker;
pub use transcript::Transcript;
