//! create-checkpoint: stash-based safety net on Stop
//!
//! Creates a prefixed stash entry while leaving the working tree untouched
//! (push then immediately re-apply, never pop), then trims the oldest
//! prefixed checkpoints beyond the configured cap. Every git call runs with
//! `--no-pager` and advice output silenced.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use claudekit_core::constants::{CHECKPOINT_PREFIX, DEFAULT_MAX_CHECKPOINTS};
use claudekit_core::{GitError, Result};

use crate::hooks::exec::{CommandOutput, run_argv};
use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckpointConfig {
    pub prefix: Option<String>,
    pub max_checkpoints: Option<usize>,
    pub timeout: Option<u64>,
}

pub struct CreateCheckpoint;

const GIT_TIMEOUT: Duration = Duration::from_secs(15);

async fn git(root: &Path, args: &[&str]) -> Result<CommandOutput> {
    let mut full = vec!["--no-pager", "-c", "advice.detachedHead=false"];
    full.extend_from_slice(args);
    run_argv("git", &full, root, GIT_TIMEOUT).await
}

#[async_trait]
impl Hook for CreateCheckpoint {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        // stop_hook_active is short-circuited by the base runtime before any
        // git command can run; this hook only sees fresh stop events.
        let cfg: CheckpointConfig = ctx.hook_config();
        let root = ctx.project_root();

        let inside = git(&root, &["rev-parse", "--is-inside-work-tree"]).await;
        match inside {
            Ok(out) if out.success() && out.stdout.trim() == "true" => {}
            _ => return Ok(Outcome::Skip(SkipReason::EnvironmentAbsent)),
        }

        let status = git(&root, &["status", "--porcelain"]).await?;
        if !status.success() {
            return Err(GitError::CommandFailed {
                command: "status".into(),
                stderr: status.stderr,
            }
            .into());
        }
        if status.stdout.trim().is_empty() {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }

        let prefix = cfg.prefix.as_deref().unwrap_or(CHECKPOINT_PREFIX);
        let message = format!("{prefix}{}", Utc::now().format("%Y-%m-%dT%H:%M:%SZ"));

        // push + apply preserves the working tree exactly; pop would drop
        // the entry we just created
        let push = git(
            &root,
            &["stash", "push", "--include-untracked", "-m", &message],
        )
        .await?;
        if !push.success() {
            return Err(GitError::CommandFailed {
                command: "stash push".into(),
                stderr: push.combined(),
            }
            .into());
        }
        let apply = git(&root, &["stash", "apply", "-q", "stash@{0}"]).await?;
        if !apply.success() {
            return Err(GitError::CommandFailed {
                command: "stash apply".into(),
                stderr: apply.combined(),
            }
            .into());
        }

        let max = cfg.max_checkpoints.unwrap_or(DEFAULT_MAX_CHECKPOINTS);
        trim_checkpoints(&root, prefix, max).await?;

        Ok(Outcome::Allow)
    }
}

/// Drop the oldest prefixed stash entries beyond `max`. Oldest entries have
/// the highest indices, so dropping back-to-front keeps indices stable.
async fn trim_checkpoints(root: &Path, prefix: &str, max: usize) -> Result<()> {
    let list = git(root, &["stash", "list"]).await?;
    if !list.success() {
        return Ok(());
    }
    let prefixed: Vec<usize> = list
        .stdout
        .lines()
        .filter_map(|line| parse_stash_line(line, prefix))
        .collect();
    if prefixed.len() <= max {
        return Ok(());
    }
    for index in prefixed.into_iter().skip(max).rev() {
        let target = format!("stash@{{{index}}}");
        let drop = git(root, &["stash", "drop", "-q", &target]).await?;
        if !drop.success() {
            tracing::warn!("failed to drop {target}: {}", drop.stderr.trim());
            break;
        }
    }
    Ok(())
}

/// Stash index when the line's message carries our prefix.
fn parse_stash_line(line: &str, prefix: &str) -> Option<usize> {
    let index: usize = line
        .strip_prefix("stash@{")?
        .split_once('}')?
        .0
        .parse()
        .ok()?;
    line.contains(prefix).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stash_line() {
        let line = "stash@{2}: On main: claude-checkpoint:2026-08-01T10:00:00Z";
        assert_eq!(parse_stash_line(line, "claude-checkpoint:"), Some(2));
        let foreign = "stash@{0}: WIP on main: 1a2b3c4 something";
        assert_eq!(parse_stash_line(foreign, "claude-checkpoint:"), None);
        assert_eq!(parse_stash_line("garbage", "claude-checkpoint:"), None);
    }

    #[test]
    fn test_prefixed_selection_order() {
        let listing = "\
stash@{0}: On main: claude-checkpoint:2026-08-01T12:00:00Z
stash@{1}: WIP on main: 9f8e7d6 unrelated
stash@{2}: On main: claude-checkpoint:2026-08-01T11:00:00Z
stash@{3}: On main: claude-checkpoint:2026-08-01T10:00:00Z";
        let prefixed: Vec<usize> = listing
            .lines()
            .filter_map(|l| parse_stash_line(l, "claude-checkpoint:"))
            .collect();
        // Newest first, as git lists them; trimming skips the newest `max`
        assert_eq!(prefixed, vec![0, 2, 3]);
        let to_drop: Vec<usize> = prefixed.into_iter().skip(2).rev().collect();
        assert_eq!(to_drop, vec![3]);
    }
}
