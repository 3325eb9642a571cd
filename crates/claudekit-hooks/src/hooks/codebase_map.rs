//! codebase-map / codebase-map-update: project map injection
//!
//! Once per session the external project mapper is invoked and its DSL
//! output injected as context; a session flag prevents re-injection. The
//! PostToolUse variant keeps the map fresh by updating it incrementally
//! after file changes.

use async_trait::async_trait;
use serde::Deserialize;

use claudekit_core::Result;
use claudekit_core::config::debug_enabled;
use claudekit_core::constants::CODEBASE_MAP_FLAG;

use crate::hooks::exec::run_shell;
use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};
use crate::io::response::cap_injection;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodebaseMapConfig {
    pub command: Option<String>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub format: Option<String>,
    pub timeout: Option<u64>,
}

fn shell_quote(glob: &str) -> String {
    format!("'{}'", glob.replace('\'', r"'\''"))
}

/// Compose the mapper command line from config.
fn format_command(cfg: &CodebaseMapConfig) -> String {
    let base = cfg.command.as_deref().unwrap_or("codebase-map");
    let mut cmd = format!(
        "{base} format --format {}",
        cfg.format.as_deref().unwrap_or("dsl")
    );
    for glob in cfg.include.iter().flatten() {
        cmd.push_str(&format!(" --include {}", shell_quote(glob)));
    }
    for glob in cfg.exclude.iter().flatten() {
        cmd.push_str(&format!(" --exclude {}", shell_quote(glob)));
    }
    cmd
}

pub struct CodebaseMap;

#[async_trait]
impl Hook for CodebaseMap {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        if ctx.session.flag_is_true(CODEBASE_MAP_FLAG) {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        let cfg: CodebaseMapConfig = ctx.hook_config();
        let root = ctx.project_root();
        let timeout = ctx.timeout();

        // Build (or refresh) the index, then format it
        let base = cfg.command.as_deref().unwrap_or("codebase-map");
        let scan = run_shell(
            &format!("{base} scan"),
            &root,
            timeout,
            ctx.config.environment(),
        )
        .await;
        match &scan {
            Ok(out) if out.status == Some(127) => {
                return Ok(Outcome::Skip(SkipReason::EnvironmentAbsent));
            }
            Err(_) => return Ok(Outcome::Skip(SkipReason::EnvironmentAbsent)),
            _ => {}
        }

        let output = run_shell(&format_command(&cfg), &root, timeout, ctx.config.environment())
            .await?;
        if !output.success() || output.stdout.trim().is_empty() {
            tracing::debug!("codebase map unavailable: {}", output.stderr.trim());
            return Ok(Outcome::Skip(SkipReason::EnvironmentAbsent));
        }

        // Profiling and manual runs must not mark real sessions as loaded
        if !ctx.session.is_ephemeral() && !debug_enabled() {
            ctx.session.set_flag(CODEBASE_MAP_FLAG, "true");
        }

        let map = cap_injection(&output.stdout);
        Ok(Outcome::InjectContext {
            text: format!("Project map (auto-generated):\n\n{map}"),
        })
    }
}

pub struct CodebaseMapUpdate;

#[async_trait]
impl Hook for CodebaseMapUpdate {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        // Only worth updating once a map was injected for this session
        if !ctx.session.flag_is_true(CODEBASE_MAP_FLAG) {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        let Some(path) = ctx.payload.file_path().map(String::from) else {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        };
        let cfg: CodebaseMapConfig = ctx.hook_config();
        let base = cfg.command.as_deref().unwrap_or("codebase-map");
        let command = format!("{base} update {}", shell_quote(&path));

        match run_shell(&command, &ctx.project_root(), ctx.timeout(), ctx.config.environment())
            .await
        {
            Ok(out) if out.success() => Ok(Outcome::Allow),
            Ok(out) => {
                // Map maintenance must never block an edit
                tracing::debug!("codebase-map update failed: {}", out.stderr.trim());
                Ok(Outcome::Allow)
            }
            Err(e) => {
                tracing::debug!("codebase-map update unavailable: {e}");
                Ok(Outcome::Allow)
            }
        }
    }
}
