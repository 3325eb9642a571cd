//! Claudekit hook engine
//!
//! One-shot CLI the host invokes per lifecycle event: it reads a JSON
//! payload on stdin, routes it through the hook registry, and answers with
//! the exit code and JSON the host expects. See `claudekit-core` for the
//! shared foundations (config, sessions, transcripts, file guard).

pub mod cli;
pub mod hooks;
pub mod io;

pub use cli::{Cli, Commands};
