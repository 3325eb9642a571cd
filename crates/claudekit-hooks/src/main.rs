use clap::Parser;
use tracing_subscriber::EnvFilter;

use claudekit_hooks::cli::{Cli, CliContext};

// Single-threaded runtime: hook invocations are one-shot and latency-bound,
// startup cost matters more than parallelism.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let code = CliContext::new().execute(cli.command).await;
    std::process::exit(code);
}

/// Diagnostics go to stderr only; stdout belongs to the host protocol.
fn init_tracing() {
    let default = if claudekit_core::config::debug_enabled() {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
