//! test-changed / test-project: run the project's test command
//!
//! The project-wide variant caps its timeout at 55 s so the host's 60 s hook
//! ceiling is never hit from inside. Vitest gets watch mode and worker
//! fan-out disabled through the environment so a killed run cannot leave
//! orphaned workers behind.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use claudekit_core::Result;
use claudekit_core::constants::{DEFAULT_HOOK_TIMEOUT, PROJECT_TEST_TIMEOUT};

use crate::hooks::exec::run_shell;
use crate::hooks::project::has_extension;
use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};

const SOURCE_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub command: Option<String>,
    pub timeout: Option<u64>,
}

pub struct TestChanged;
pub struct TestProject;

/// Environment discouraging orphaned vitest workers.
fn test_env(base: &HashMap<String, String>) -> HashMap<String, String> {
    let mut env = base.clone();
    env.insert("VITEST_WATCH".into(), "false".into());
    env.insert("VITEST_MIN_FORKS".into(), "1".into());
    env.insert("VITEST_MAX_FORKS".into(), "1".into());
    env.insert("CI".into(), "true".into());
    env
}

async fn run_tests(ctx: &HookContext, project_wide: bool) -> Result<Outcome> {
    let root = ctx.project_root();
    if !root.join("package.json").is_file() {
        return Ok(Outcome::Skip(SkipReason::EnvironmentAbsent));
    }
    let cfg: TestConfig = ctx.hook_config();
    let command = cfg.command.unwrap_or_else(|| "npm test".to_string());

    let fallback = if project_wide {
        PROJECT_TEST_TIMEOUT
    } else {
        DEFAULT_HOOK_TIMEOUT
    };
    // Whatever is configured, project-wide runs stay under the host ceiling
    let timeout = ctx
        .config
        .effective_timeout(cfg.timeout, fallback)
        .min(PROJECT_TEST_TIMEOUT);

    let env = test_env(ctx.config.environment());
    let output = run_shell(&command, &root, timeout, &env).await?;
    if output.timed_out {
        return Ok(Outcome::block_with_hint(
            format!(
                "Tests timed out after {}s; partial output:\n\n{}",
                timeout.as_secs(),
                output.combined()
            ),
            format!("Run `{command}` manually; long suites may need a dedicated command here."),
        ));
    }
    if output.success() {
        return Ok(Outcome::Allow);
    }
    Ok(Outcome::block_with_hint(
        format!("Tests failed:\n\n{}", output.combined().trim_end()),
        format!("Fix the failures, then verify with `{command}`."),
    ))
}

#[async_trait]
impl Hook for TestChanged {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let Some(path) = ctx.payload.file_path() else {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        };
        if !has_extension(path, SOURCE_EXTENSIONS) {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        run_tests(ctx, false).await
    }
}

#[async_trait]
impl Hook for TestProject {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        run_tests(ctx, true).await
    }
}
