//! Subprocess execution with timeout and process-group control
//!
//! Commands run through `sh -c` in their own process group. On timeout the
//! whole group receives SIGTERM, then SIGKILL after a grace period, so a
//! linter that forked workers cannot outlive its budget. Captured output is
//! bounded and preserved even when the process is killed — a Block message
//! built from partial output beats a silent one.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use claudekit_core::constants::{KILL_GRACE_PERIOD, MAX_CAPTURE_BYTES};
use claudekit_core::{HookError, Result};

/// Outcome of one subprocess run.
#[derive(Debug)]
pub struct CommandOutput {
    /// Exit status code; `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }

    /// stdout and stderr joined for diagnostics.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Run a shell command line in `cwd` under `timeout`.
pub async fn run_shell(
    command: &str,
    cwd: &Path,
    timeout: Duration,
    envs: &HashMap<String, String>,
) -> Result<CommandOutput> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    run_command(cmd, command, cwd, timeout, envs).await
}

/// Run a program with explicit arguments (no shell) in `cwd`.
pub async fn run_argv(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    let label = format!("{program} {}", args.join(" "));
    run_command(cmd, &label, cwd, timeout, &HashMap::new()).await
}

async fn run_command(
    mut cmd: Command,
    label: &str,
    cwd: &Path,
    timeout: Duration,
    envs: &HashMap<String, String>,
) -> Result<CommandOutput> {
    cmd.current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|e| HookError::InvalidInput {
        message: format!("failed to spawn '{label}': {e}"),
    })?;

    let stdout_task = capture(child.stdout.take());
    let stderr_task = capture(child.stderr.take());

    let (status, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => (status?.code(), false),
        Err(_) => {
            tracing::debug!("'{label}' exceeded {}ms; terminating group", timeout.as_millis());
            terminate_group(&mut child).await;
            (None, true)
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        timed_out,
        duration: start.elapsed(),
    })
}

/// Drain one output stream into a bounded string.
fn capture<R>(stream: Option<R>) -> tokio::task::JoinHandle<String>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut stream) = stream else {
            return String::new();
        };
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if buf.len() + n > MAX_CAPTURE_BYTES {
                        buf.extend_from_slice(&chunk[..MAX_CAPTURE_BYTES - buf.len()]);
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// SIGTERM the process group, give it the grace period, then SIGKILL.
#[cfg(unix)]
async fn terminate_group(child: &mut Child) {
    if let Some(pid) = child.id() {
        // process_group(0) made the child its own group leader
        unsafe { libc::killpg(pid as i32, libc::SIGTERM) };
        if tokio::time::timeout(KILL_GRACE_PERIOD, child.wait())
            .await
            .is_ok()
        {
            return;
        }
        unsafe { libc::killpg(pid as i32, libc::SIGKILL) };
    } else {
        let _ = child.start_kill();
    }
    let _ = child.wait().await;
}

#[cfg(not(unix))]
async fn terminate_group(child: &mut Child) {
    let _ = child.start_kill();
    let _ = tokio::time::timeout(KILL_GRACE_PERIOD, child.wait()).await;
}
