//! Base hook runtime: the lifecycle every implementation inherits
//!
//! Order per invocation: disable check, stop-loop short-circuit, subagent
//! skip, matcher check, config merge, execution under a timeout, response,
//! log. The dispatcher drives this; implementations only see `run`.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use claudekit_core::config::Config;
use claudekit_core::constants::DEFAULT_HOOK_TIMEOUT;
use claudekit_core::transcript::Transcript;
use claudekit_core::{HookEvent, Result, SessionTracker};

use crate::hooks::HookDefinition;
use crate::hooks::matcher::matches_tool;
use crate::io::HookPayload;

/// Permission ruling for PreToolUse responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRuling {
    Allow,
    Deny,
    Ask,
}

impl PermissionRuling {
    pub const fn as_str(self) -> &'static str {
        match self {
            PermissionRuling::Allow => "allow",
            PermissionRuling::Deny => "deny",
            PermissionRuling::Ask => "ask",
        }
    }
}

/// Why a hook did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Disabled for this session via `hooks disable`
    Disabled,
    /// Event originates from a subagent and the hook opts out
    Subagent,
    /// Tool name did not match the hook's matcher
    MatcherMiss,
    /// `stop_hook_active` loop prevention
    StopLoop,
    /// Required project tooling is not installed
    EnvironmentAbsent,
    /// Nothing for this hook to do (wrong file type, no changes, …)
    NotApplicable,
}

impl SkipReason {
    /// Outcome tag recorded in the execution log.
    pub const fn tag(self) -> &'static str {
        match self {
            SkipReason::Disabled => "skipped:disabled",
            SkipReason::Subagent => "skipped:subagent",
            SkipReason::MatcherMiss => "skipped:matcher",
            SkipReason::StopLoop => "skipped:stop-loop",
            SkipReason::EnvironmentAbsent => "skipped:environment",
            SkipReason::NotApplicable => "skipped:not-applicable",
        }
    }
}

/// What a hook decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Pass-through; the host proceeds
    Allow,
    /// Prevent the event / surface an error to the model (exit 2)
    Block {
        reason: String,
        fix_hint: Option<String>,
    },
    /// Prepend context to the next prompt (UserPromptSubmit/SessionStart)
    InjectContext { text: String },
    /// PreToolUse permission decision
    PermissionDecision {
        decision: PermissionRuling,
        reason: Option<String>,
    },
    /// No-op with a recorded reason
    Skip(SkipReason),
}

impl Outcome {
    pub fn block(reason: impl Into<String>) -> Self {
        Outcome::Block {
            reason: reason.into(),
            fix_hint: None,
        }
    }

    pub fn block_with_hint(reason: impl Into<String>, hint: impl Into<String>) -> Self {
        Outcome::Block {
            reason: reason.into(),
            fix_hint: Some(hint.into()),
        }
    }

    /// Tag recorded in the execution log.
    pub fn tag(&self) -> String {
        match self {
            Outcome::Allow => "allow".into(),
            Outcome::Block { .. } => "block".into(),
            Outcome::InjectContext { .. } => "inject".into(),
            Outcome::PermissionDecision { decision, .. } => {
                format!("permission:{}", decision.as_str())
            }
            Outcome::Skip(reason) => reason.tag().into(),
        }
    }
}

/// Minimal per-hook config every hook shares; hook-specific structs add
/// their own keys on top.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BaseHookConfig {
    pub timeout: Option<u64>,
}

/// Everything a hook implementation may consult.
pub struct HookContext {
    pub definition: &'static HookDefinition,
    pub payload: HookPayload,
    pub config: Config,
    pub session: SessionTracker,
    transcript: OnceLock<Option<Transcript>>,
}

impl HookContext {
    pub fn new(
        definition: &'static HookDefinition,
        payload: HookPayload,
        config: Config,
        session: SessionTracker,
    ) -> Self {
        Self {
            definition,
            payload,
            config,
            session,
            transcript: OnceLock::new(),
        }
    }

    /// Typed view of `hooks.<id>` merged over `hooks.global`.
    pub fn hook_config<T>(&self) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        self.config.hook_config(self.definition.id)
    }

    /// Effective subprocess timeout for this hook.
    pub fn timeout(&self) -> Duration {
        let base: BaseHookConfig = self.hook_config();
        self.config
            .effective_timeout(base.timeout, DEFAULT_HOOK_TIMEOUT)
    }

    /// Lazily loaded transcript; `None` when the payload names no transcript
    /// or the file cannot be read.
    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript
            .get_or_init(|| {
                let path = self.payload.transcript_path.as_deref()?;
                match Transcript::load(path) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        tracing::debug!("transcript unavailable: {e}");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Project root for this invocation (configured project or cwd).
    pub fn project_root(&self) -> std::path::PathBuf {
        self.config
            .project_root()
            .map(Into::into)
            .unwrap_or_else(|| {
                claudekit_core::path::resolve_project_root(&self.payload.working_dir())
            })
    }
}

/// A hook implementation. Lifecycle concerns live in [`pre_execution_skip`]
/// and the dispatcher; `run` only encodes the hook's own contract.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome>;
}

/// The lifecycle checks that precede execution. Returns the skip to emit,
/// or `None` when the hook should run.
pub fn pre_execution_skip(
    definition: &HookDefinition,
    event: HookEvent,
    payload: &HookPayload,
    session: &SessionTracker,
    transcript_subagent: impl FnOnce() -> bool,
) -> Option<SkipReason> {
    if session.is_disabled(definition.id) {
        return Some(SkipReason::Disabled);
    }
    if event.is_stop_event() && payload.stop_loop_active() {
        return Some(SkipReason::StopLoop);
    }
    if definition.disabled_in_subagent && (event == HookEvent::SubagentStop || transcript_subagent())
    {
        return Some(SkipReason::Subagent);
    }
    // An absent tool_name is universal; only a named tool can miss
    if event.is_tool_event()
        && let Some(tool) = payload.tool_name.as_deref()
        && !matches_tool(definition.matcher, tool)
    {
        return Some(SkipReason::MatcherMiss);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::definition;
    use claudekit_core::constants::UNKNOWN_SESSION_ID;

    fn payload_for(event: HookEvent, tool: Option<&str>) -> HookPayload {
        HookPayload {
            hook_event_name: Some(event.as_str().to_string()),
            tool_name: tool.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_stop_loop_short_circuits() {
        let def = definition("create-checkpoint").unwrap();
        let mut payload = payload_for(HookEvent::Stop, None);
        payload.stop_hook_active = Some(true);
        let session = SessionTracker::open(UNKNOWN_SESSION_ID);
        let skip = pre_execution_skip(def, HookEvent::Stop, &payload, &session, || false);
        assert_eq!(skip, Some(SkipReason::StopLoop));
    }

    #[test]
    fn test_matcher_miss_skips() {
        let def = definition("check-any-changed").unwrap();
        let payload = payload_for(HookEvent::PostToolUse, Some("Bash"));
        let session = SessionTracker::open(UNKNOWN_SESSION_ID);
        let skip = pre_execution_skip(def, HookEvent::PostToolUse, &payload, &session, || false);
        assert_eq!(skip, Some(SkipReason::MatcherMiss));
    }

    #[test]
    fn test_matcher_hit_runs() {
        let def = definition("check-any-changed").unwrap();
        let payload = payload_for(HookEvent::PostToolUse, Some("Edit"));
        let session = SessionTracker::open(UNKNOWN_SESSION_ID);
        let skip = pre_execution_skip(def, HookEvent::PostToolUse, &payload, &session, || false);
        assert_eq!(skip, None);
    }

    #[test]
    fn test_subagent_skip_for_flagged_hook() {
        let def = definition("self-review").unwrap();
        assert!(def.disabled_in_subagent);
        let payload = payload_for(HookEvent::Stop, None);
        let session = SessionTracker::open(UNKNOWN_SESSION_ID);
        let skip = pre_execution_skip(def, HookEvent::Stop, &payload, &session, || true);
        assert_eq!(skip, Some(SkipReason::Subagent));
    }

    #[test]
    fn test_outcome_tags() {
        assert_eq!(Outcome::Allow.tag(), "allow");
        assert_eq!(Outcome::block("x").tag(), "block");
        assert_eq!(
            Outcome::PermissionDecision {
                decision: PermissionRuling::Deny,
                reason: None
            }
            .tag(),
            "permission:deny"
        );
        assert_eq!(Outcome::Skip(SkipReason::Disabled).tag(), "skipped:disabled");
    }
}
