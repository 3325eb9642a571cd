//! Response emission per event kind
//!
//! Stdout carries host-consumed JSON only; every diagnostic goes to stderr.
//! The shapes are part of the host contract:
//!
//! - PreToolUse: `{"hookSpecificOutput":{"hookEventName","permissionDecision",
//!   "permissionDecisionReason"}}`, exit 0
//! - PostToolUse / Stop / SubagentStop: Block exits 2 with the message on
//!   stderr; Allow exits 0 silently
//! - UserPromptSubmit / SessionStart:
//!   `{"hookSpecificOutput":{"hookEventName","additionalContext"}}`, exit 0,
//!   context capped at 9 000 characters

use serde::Serialize;

use claudekit_core::constants::{MAX_INJECTION_CHARS, MAX_OUTPUT_BYTES};
use claudekit_core::{ExitCode, HookEvent};

use crate::hooks::runtime::{Outcome, PermissionRuling};

/// A fully rendered response, ready to write and exit.
#[derive(Debug, Default, PartialEq)]
pub struct RenderedResponse {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionOutput<'a> {
    hook_event_name: &'a str,
    permission_decision: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    permission_decision_reason: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextOutput<'a> {
    hook_event_name: &'a str,
    additional_context: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HookSpecificEnvelope<T> {
    hook_specific_output: T,
}

/// Render an outcome for one event.
pub fn render(event: HookEvent, outcome: &Outcome) -> RenderedResponse {
    match event {
        HookEvent::PreToolUse => render_pre_tool_use(outcome),
        HookEvent::PostToolUse | HookEvent::Stop | HookEvent::SubagentStop => {
            render_blocking(outcome)
        }
        HookEvent::UserPromptSubmit | HookEvent::SessionStart => render_injection(event, outcome),
    }
}

fn render_pre_tool_use(outcome: &Outcome) -> RenderedResponse {
    let (decision, reason) = match outcome {
        Outcome::PermissionDecision { decision, reason } => (*decision, reason.clone()),
        // A Block from a PreToolUse hook is a denial in this protocol
        Outcome::Block { reason, .. } => (PermissionRuling::Deny, Some(reason.clone())),
        Outcome::Allow => (PermissionRuling::Allow, None),
        Outcome::Skip(_) => return RenderedResponse::default(),
        Outcome::InjectContext { .. } => {
            tracing::warn!("InjectContext outcome on PreToolUse; treating as allow");
            (PermissionRuling::Allow, None)
        }
    };
    let envelope = HookSpecificEnvelope {
        hook_specific_output: PermissionOutput {
            hook_event_name: HookEvent::PreToolUse.as_str(),
            permission_decision: decision.as_str(),
            permission_decision_reason: reason.as_deref(),
        },
    };
    RenderedResponse {
        stdout: serde_json::to_string(&envelope).ok().map(cap_output),
        stderr: None,
        exit_code: ExitCode::Success.code(),
    }
}

fn render_blocking(outcome: &Outcome) -> RenderedResponse {
    match outcome {
        Outcome::Block { reason, fix_hint } => {
            let mut message = reason.clone();
            if let Some(hint) = fix_hint {
                message.push_str("\n\n");
                message.push_str(hint);
            }
            RenderedResponse {
                stdout: None,
                stderr: Some(cap_output(message)),
                exit_code: ExitCode::BlockingError.code(),
            }
        }
        Outcome::PermissionDecision { .. } | Outcome::InjectContext { .. } => {
            tracing::warn!("outcome {:?} has no rendering for this event", outcome.tag());
            RenderedResponse::default()
        }
        Outcome::Allow | Outcome::Skip(_) => RenderedResponse::default(),
    }
}

fn render_injection(event: HookEvent, outcome: &Outcome) -> RenderedResponse {
    match outcome {
        Outcome::InjectContext { text } => {
            let capped = cap_injection(text);
            if capped.is_empty() {
                return RenderedResponse::default();
            }
            let envelope = HookSpecificEnvelope {
                hook_specific_output: ContextOutput {
                    hook_event_name: event.as_str(),
                    additional_context: &capped,
                },
            };
            RenderedResponse {
                stdout: serde_json::to_string(&envelope).ok().map(cap_output),
                stderr: None,
                exit_code: ExitCode::Success.code(),
            }
        }
        // Prompt-time hooks may still block (e.g. validation failures)
        Outcome::Block { reason, .. } => RenderedResponse {
            stdout: None,
            stderr: Some(cap_output(reason.clone())),
            exit_code: ExitCode::BlockingError.code(),
        },
        _ => RenderedResponse::default(),
    }
}

/// Truncate injected context to the character cap, on a char boundary.
pub fn cap_injection(text: &str) -> String {
    if text.chars().count() <= MAX_INJECTION_CHARS {
        return text.to_string();
    }
    text.chars().take(MAX_INJECTION_CHARS).collect()
}

fn cap_output(mut text: String) -> String {
    if text.len() > MAX_OUTPUT_BYTES {
        let mut cut = MAX_OUTPUT_BYTES;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::runtime::SkipReason;

    #[test]
    fn test_pre_tool_use_deny_shape() {
        let outcome = Outcome::PermissionDecision {
            decision: PermissionRuling::Deny,
            reason: Some("'.env' is protected".into()),
        };
        let rendered = render(HookEvent::PreToolUse, &outcome);
        assert_eq!(rendered.exit_code, 0);
        let json: serde_json::Value =
            serde_json::from_str(rendered.stdout.as_deref().unwrap()).unwrap();
        let out = &json["hookSpecificOutput"];
        assert_eq!(out["hookEventName"], "PreToolUse");
        assert_eq!(out["permissionDecision"], "deny");
        assert!(
            out["permissionDecisionReason"]
                .as_str()
                .unwrap()
                .contains(".env")
        );
    }

    #[test]
    fn test_pre_tool_use_block_renders_as_deny() {
        let rendered = render(HookEvent::PreToolUse, &Outcome::block("no"));
        let json: serde_json::Value =
            serde_json::from_str(rendered.stdout.as_deref().unwrap()).unwrap();
        assert_eq!(json["hookSpecificOutput"]["permissionDecision"], "deny");
        assert_eq!(rendered.exit_code, 0);
    }

    #[test]
    fn test_post_tool_use_block_exits_2() {
        let outcome = Outcome::block_with_hint("found `: any`", "Run npx tsc --noEmit");
        let rendered = render(HookEvent::PostToolUse, &outcome);
        assert_eq!(rendered.exit_code, 2);
        assert!(rendered.stdout.is_none());
        let err = rendered.stderr.unwrap();
        assert!(err.contains(": any"));
        assert!(err.contains("tsc"));
    }

    #[test]
    fn test_allow_is_silent() {
        for event in [HookEvent::PostToolUse, HookEvent::Stop, HookEvent::SubagentStop] {
            let rendered = render(event, &Outcome::Allow);
            assert_eq!(rendered, RenderedResponse::default());
        }
    }

    #[test]
    fn test_skip_is_silent_everywhere() {
        for event in HookEvent::all() {
            let rendered = render(*event, &Outcome::Skip(SkipReason::Disabled));
            assert!(rendered.stdout.is_none());
            assert!(rendered.stderr.is_none());
            assert_eq!(rendered.exit_code, 0);
        }
    }

    #[test]
    fn test_injection_shape() {
        let outcome = Outcome::InjectContext {
            text: "megathink".into(),
        };
        let rendered = render(HookEvent::UserPromptSubmit, &outcome);
        assert_eq!(rendered.exit_code, 0);
        let json: serde_json::Value =
            serde_json::from_str(rendered.stdout.as_deref().unwrap()).unwrap();
        assert_eq!(
            json["hookSpecificOutput"]["additionalContext"],
            "megathink"
        );
        assert_eq!(
            json["hookSpecificOutput"]["hookEventName"],
            "UserPromptSubmit"
        );
    }

    #[test]
    fn test_injection_capped_at_9000_chars() {
        let outcome = Outcome::InjectContext {
            text: "x".repeat(20_000),
        };
        let rendered = render(HookEvent::SessionStart, &outcome);
        let json: serde_json::Value =
            serde_json::from_str(rendered.stdout.as_deref().unwrap()).unwrap();
        let ctx = json["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap();
        assert_eq!(ctx.chars().count(), 9_000);
    }

    #[test]
    fn test_injection_cap_respects_char_boundaries() {
        let outcome = Outcome::InjectContext {
            text: "é".repeat(10_000),
        };
        let rendered = render(HookEvent::SessionStart, &outcome);
        let json: serde_json::Value =
            serde_json::from_str(rendered.stdout.as_deref().unwrap()).unwrap();
        let ctx = json["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap();
        assert_eq!(ctx.chars().count(), 9_000);
    }
}
