//! typecheck-changed / typecheck-project: TypeScript compiler gate
//!
//! Skips quietly unless the project shows TypeScript evidence (tsconfig plus
//! an installed compiler). On diagnostics, blocks with the raw compiler
//! output and the exact command to reproduce.

use async_trait::async_trait;
use serde::Deserialize;

use claudekit_core::Result;
use claudekit_core::constants::DEFAULT_HOOK_TIMEOUT;

use crate::hooks::exec::run_shell;
use crate::hooks::project::{has_extension, is_typescript_project, package_script};
use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypecheckConfig {
    pub command: Option<String>,
    pub timeout: Option<u64>,
}

pub struct TypecheckChanged;
pub struct TypecheckProject;

async fn run_typecheck(ctx: &HookContext) -> Result<Outcome> {
    let root = ctx.project_root();
    if !is_typescript_project(&root) {
        return Ok(Outcome::Skip(SkipReason::EnvironmentAbsent));
    }

    let cfg: TypecheckConfig = ctx.hook_config();
    let command = cfg
        .command
        .or_else(|| package_script(&root, "typecheck"))
        .unwrap_or_else(|| "npx tsc --noEmit".to_string());
    let timeout = ctx
        .config
        .effective_timeout(cfg.timeout, DEFAULT_HOOK_TIMEOUT);

    let output = run_shell(&command, &root, timeout, ctx.config.environment()).await?;
    if output.timed_out {
        return Ok(Outcome::block_with_hint(
            format!(
                "Typecheck timed out after {}s. Partial output:\n\n{}",
                timeout.as_secs(),
                output.combined()
            ),
            format!("Run `{command}` manually to see the full diagnostics."),
        ));
    }

    let combined = output.combined();
    let has_diagnostics = combined.lines().any(|l| l.contains("error TS"));
    if output.success() && !has_diagnostics {
        return Ok(Outcome::Allow);
    }
    Ok(Outcome::block_with_hint(
        format!("TypeScript check failed:\n\n{}", combined.trim_end()),
        format!("Fix the reported diagnostics, then verify with `{command}`."),
    ))
}

#[async_trait]
impl Hook for TypecheckChanged {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let Some(path) = ctx.payload.file_path() else {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        };
        if !has_extension(path, TS_EXTENSIONS) {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        run_typecheck(ctx).await
    }
}

#[async_trait]
impl Hook for TypecheckProject {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        run_typecheck(ctx).await
    }
}
