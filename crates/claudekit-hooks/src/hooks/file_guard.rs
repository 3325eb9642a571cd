//! file-guard: PreToolUse gate over sensitive files
//!
//! Direct file tools are checked by path; Bash commands are parsed for the
//! paths they implicate. The verdict is always a permission decision:
//! `deny` with a reason for protected paths, `allow` otherwise — the host
//! expects a decision JSON on every invocation.

use async_trait::async_trait;

use claudekit_core::Result;
use claudekit_core::guard::{FileGuard as GuardEngine, GuardVerdict};

use crate::hooks::runtime::{Hook, HookContext, Outcome, PermissionRuling};

pub struct FileGuard;

#[async_trait]
impl Hook for FileGuard {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let engine = GuardEngine::new(&ctx.project_root());

        let verdict = if ctx.payload.tool() == "Bash" {
            match ctx.payload.command() {
                Some(command) => engine.evaluate_command(command),
                None => GuardVerdict::Allow,
            }
        } else {
            ctx.payload
                .candidate_paths()
                .iter()
                .map(|p| engine.evaluate_path(p))
                .find(GuardVerdict::is_deny)
                .unwrap_or(GuardVerdict::Allow)
        };

        Ok(match verdict {
            GuardVerdict::Allow => Outcome::PermissionDecision {
                decision: PermissionRuling::Allow,
                reason: None,
            },
            GuardVerdict::Deny { reason } => Outcome::PermissionDecision {
                decision: PermissionRuling::Deny,
                reason: Some(reason),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::testing::context_for;
    use serde_json::json;

    async fn decide(payload: serde_json::Value) -> Outcome {
        let ctx = context_for("file-guard", payload);
        FileGuard.run(&ctx).await.unwrap()
    }

    fn decision_is(outcome: &Outcome, expected: PermissionRuling) -> bool {
        matches!(outcome, Outcome::PermissionDecision { decision, .. } if *decision == expected)
    }

    #[tokio::test]
    async fn test_env_read_denied() {
        let outcome = decide(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Read",
            "tool_input": {"file_path": ".env"}
        }))
        .await;
        assert!(decision_is(&outcome, PermissionRuling::Deny));
    }

    #[tokio::test]
    async fn test_template_read_allowed() {
        let outcome = decide(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Read",
            "tool_input": {"file_path": ".env.example"}
        }))
        .await;
        assert!(decision_is(&outcome, PermissionRuling::Allow));
    }

    #[tokio::test]
    async fn test_git_revision_command_allowed() {
        let outcome = decide(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Bash",
            "tool_input": {"command": "git log @{u}..HEAD"}
        }))
        .await;
        assert!(decision_is(&outcome, PermissionRuling::Allow));
    }

    #[tokio::test]
    async fn test_bash_env_access_denied() {
        let outcome = decide(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Bash",
            "tool_input": {"command": "cat .env | grep API_KEY"}
        }))
        .await;
        assert!(decision_is(&outcome, PermissionRuling::Deny));
    }

    #[tokio::test]
    async fn test_tmp_write_allowed() {
        let outcome = decide(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Write",
            "tool_input": {"file_path": "/tmp/research-output.md", "content": "x"}
        }))
        .await;
        assert!(decision_is(&outcome, PermissionRuling::Allow));
    }

    #[tokio::test]
    async fn test_missing_tool_input_allows() {
        let outcome = decide(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Bash"
        }))
        .await;
        assert!(decision_is(&outcome, PermissionRuling::Allow));
    }
}
