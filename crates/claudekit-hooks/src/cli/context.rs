//! CLI execution context: wires subcommands to the dispatcher and
//! translates every outcome into the process exit code.

use std::sync::OnceLock;

use claudekit_core::{ExitCode, HookError};

use crate::cli::commands::Commands;
use crate::cli::dispatcher::HookDispatcher;
use crate::cli::{inspect, profile};

/// Dependency container with lazy dispatcher initialization; inspection
/// subcommands never pay for registry construction twice.
#[derive(Default)]
pub struct CliContext {
    dispatcher: OnceLock<HookDispatcher>,
}

impl CliContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn dispatcher(&self) -> &HookDispatcher {
        self.dispatcher.get_or_init(HookDispatcher::new)
    }

    /// Execute a command and return the exit code to the shell.
    pub async fn execute(&self, command: Commands) -> i32 {
        match self.run_command(command).await {
            Ok(code) => code,
            Err(err) => {
                eprintln!("hooks: {err}");
                ExitCode::from(&err).code()
            }
        }
    }

    async fn run_command(&self, command: Commands) -> Result<i32, HookError> {
        match command {
            Commands::Run { hook_id } => {
                let report = self.dispatcher().run(&hook_id).await?;
                if let Some(stdout) = &report.rendered.stdout {
                    println!("{stdout}");
                }
                if let Some(stderr) = &report.rendered.stderr {
                    eprintln!("{stderr}");
                }
                Ok(report.rendered.exit_code)
            }
            Commands::List => {
                print!("{}", inspect::render_list());
                Ok(ExitCode::Success.code())
            }
            Commands::Stats { hook } => {
                let log = self.dispatcher().execution_log();
                print!("{}", inspect::render_stats(log, hook.as_deref())?);
                Ok(ExitCode::Success.code())
            }
            Commands::Recent { hook, count } => {
                let log = self.dispatcher().execution_log();
                print!("{}", inspect::render_recent(log, hook.as_deref(), count)?);
                Ok(ExitCode::Success.code())
            }
            Commands::Profile {
                hook_id,
                iterations,
            } => {
                let report =
                    profile::run_profile(self.dispatcher(), hook_id.as_deref(), iterations).await?;
                print!("{report}");
                Ok(ExitCode::Success.code())
            }
            Commands::Disable { hook_id, session } => {
                print!("{}", inspect::toggle_hook(&hook_id, session.as_deref(), false)?);
                Ok(ExitCode::Success.code())
            }
            Commands::Enable { hook_id, session } => {
                print!("{}", inspect::toggle_hook(&hook_id, session.as_deref(), true)?);
                Ok(ExitCode::Success.code())
            }
            Commands::Status { hook_id } => {
                print!("{}", inspect::render_status(hook_id.as_deref())?);
                Ok(ExitCode::Success.code())
            }
            Commands::Settings => {
                println!("{}", inspect::render_settings());
                Ok(ExitCode::Success.code())
            }
        }
    }
}
