//! Command-line interface definitions

use clap::{Parser, Subcommand};

/// Claudekit hook engine CLI
#[derive(Parser, Debug)]
#[command(name = "hooks")]
#[command(about = "Event-driven hook engine for AI coding assistants")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a hook against the payload on stdin
    Run {
        /// Hook id (see `hooks list`)
        hook_id: String,
    },

    /// List registered hooks with their trigger events and matchers
    List,

    /// Aggregate execution-log statistics per hook
    Stats {
        /// Restrict to one hook
        #[arg(long)]
        hook: Option<String>,
    },

    /// Show recent execution-log entries
    Recent {
        /// Restrict to one hook
        #[arg(long)]
        hook: Option<String>,

        /// Number of entries to show
        #[arg(long, default_value_t = 20)]
        count: usize,
    },

    /// Benchmark hooks with synthetic payloads
    Profile {
        /// Hook id; all hooks when omitted
        hook_id: Option<String>,

        /// Iterations per hook
        #[arg(long, default_value_t = 10)]
        iterations: usize,
    },

    /// Disable a hook for a session
    Disable {
        hook_id: String,

        /// Session id; defaults to the most recently active session
        #[arg(long)]
        session: Option<String>,
    },

    /// Re-enable a hook for a session
    Enable {
        hook_id: String,

        /// Session id; defaults to the most recently active session
        #[arg(long)]
        session: Option<String>,
    },

    /// Show hook metadata and per-session state
    Status {
        /// Hook id; all hooks when omitted
        hook_id: Option<String>,
    },

    /// Print the host settings `hooks` object generated from the registry
    Settings,
}

impl Commands {
    /// Whether this command reads a JSON payload from stdin.
    pub fn expects_stdin(&self) -> bool {
        matches!(self, Commands::Run { .. })
    }
}

impl std::fmt::Display for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Commands::Run { hook_id } => write!(f, "run {hook_id}"),
            Commands::List => write!(f, "list"),
            Commands::Stats { .. } => write!(f, "stats"),
            Commands::Recent { .. } => write!(f, "recent"),
            Commands::Profile { .. } => write!(f, "profile"),
            Commands::Disable { hook_id, .. } => write!(f, "disable {hook_id}"),
            Commands::Enable { hook_id, .. } => write!(f, "enable {hook_id}"),
            Commands::Status { .. } => write!(f, "status"),
            Commands::Settings => write!(f, "settings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_parses_hook_id() {
        let cli = Cli::try_parse_from(["hooks", "run", "check-any-changed"]).unwrap();
        match cli.command {
            Commands::Run { hook_id } => assert_eq!(hook_id, "check-any-changed"),
            other => panic!("unexpected command {other}"),
        }
        assert!(
            Cli::try_parse_from(["hooks", "run", "x"])
                .unwrap()
                .command
                .expects_stdin()
        );
    }

    #[test]
    fn test_profile_defaults() {
        let cli = Cli::try_parse_from(["hooks", "profile"]).unwrap();
        match cli.command {
            Commands::Profile {
                hook_id,
                iterations,
            } => {
                assert!(hook_id.is_none());
                assert_eq!(iterations, 10);
            }
            other => panic!("unexpected command {other}"),
        }
    }

    #[test]
    fn test_disable_with_session() {
        let cli =
            Cli::try_parse_from(["hooks", "disable", "self-review", "--session", "abc"]).unwrap();
        match cli.command {
            Commands::Disable { hook_id, session } => {
                assert_eq!(hook_id, "self-review");
                assert_eq!(session.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command {other}"),
        }
    }
}
