//! Command-line interface for the hook engine
//!
//! Parsing, dispatch, and the inspection/profiling subcommands.

mod commands;
pub mod context;
pub mod dispatcher;
pub mod inspect;
pub mod profile;

pub use commands::{Cli, Commands};
pub use context::CliContext;
pub use dispatcher::{HookDispatcher, InputProvider, RunReport};
