//! lint-changed / lint-project: multi-linter gate
//!
//! Runs every linter the project shows evidence for (Biome, ESLint) in one
//! pass and aggregates their diagnostics. Errors block; warnings pass
//! through unless the exit code says otherwise. A configured `command`
//! replaces detection entirely.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use claudekit_core::Result;
use claudekit_core::constants::DEFAULT_HOOK_TIMEOUT;

use crate::hooks::exec::run_shell;
use crate::hooks::project::{has_biome, has_eslint, has_extension};
use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};

const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub command: Option<String>,
    pub fix: Option<bool>,
    pub extensions: Option<Vec<String>>,
    pub timeout: Option<u64>,
}

pub struct LintChanged;
pub struct LintProject;

/// The lint commands this project supports, in run order.
fn detect_commands(root: &Path, cfg: &LintConfig) -> Vec<(&'static str, String)> {
    if let Some(command) = &cfg.command {
        return vec![("lint", command.clone())];
    }
    let fix = cfg.fix == Some(true);
    let mut commands = Vec::new();
    if has_biome(root) {
        let mut cmd = String::from("npx biome check .");
        if fix {
            cmd.push_str(" --write");
        }
        commands.push(("biome", cmd));
    }
    if has_eslint(root) {
        let mut cmd = String::from("npx eslint .");
        if fix {
            cmd.push_str(" --fix");
        }
        commands.push(("eslint", cmd));
    }
    commands
}

async fn run_lint(ctx: &HookContext) -> Result<Outcome> {
    let cfg: LintConfig = ctx.hook_config();
    let root = ctx.project_root();
    let commands = detect_commands(&root, &cfg);
    if commands.is_empty() {
        return Ok(Outcome::Skip(SkipReason::EnvironmentAbsent));
    }
    let timeout = ctx
        .config
        .effective_timeout(cfg.timeout, DEFAULT_HOOK_TIMEOUT);

    let mut failures: Vec<String> = Vec::new();
    for (tool, command) in &commands {
        let output = run_shell(command, &root, timeout, ctx.config.environment()).await?;
        if output.timed_out {
            failures.push(format!(
                "{tool} timed out after {}s; partial output:\n{}",
                timeout.as_secs(),
                output.combined()
            ));
        } else if !output.success() {
            failures.push(format!("{tool} reported problems:\n{}", output.combined()));
        }
    }

    if failures.is_empty() {
        return Ok(Outcome::Allow);
    }
    let commands_list = commands
        .iter()
        .map(|(_, c)| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Outcome::block_with_hint(
        failures.join("\n\n"),
        format!("Fix the reported problems, then verify with {commands_list}."),
    ))
}

#[async_trait]
impl Hook for LintChanged {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let cfg: LintConfig = ctx.hook_config();
        let Some(path) = ctx.payload.file_path() else {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        };
        let extensions: Vec<&str> = cfg
            .extensions
            .as_ref()
            .map(|e| e.iter().map(String::as_str).collect())
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.to_vec());
        if !has_extension(path, &extensions) {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        run_lint(ctx).await
    }
}

#[async_trait]
impl Hook for LintProject {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        run_lint(ctx).await
    }
}
