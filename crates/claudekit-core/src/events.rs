//! Claude Code hook event constants and types
//!
//! Single source of truth for the event names the host sends in the
//! `hook_event_name` field, to prevent string duplication and typos
//! across the codebase.

use std::fmt::{self, Display};

/// Hook event name constants
///
/// These are the exact strings the host writes into `hook_event_name`.
/// They must match the host's implementation exactly (CamelCase on the wire).
pub mod event_constants {
    /// Pre-tool execution hook event
    pub const PRE_TOOL_USE: &str = "PreToolUse";

    /// Post-tool execution hook event
    pub const POST_TOOL_USE: &str = "PostToolUse";

    /// Main-agent stop hook event
    pub const STOP: &str = "Stop";

    /// Subagent completion hook event
    pub const SUBAGENT_STOP: &str = "SubagentStop";

    /// Session start hook event (new or resumed session)
    pub const SESSION_START: &str = "SessionStart";

    /// User prompt submission hook event
    pub const USER_PROMPT_SUBMIT: &str = "UserPromptSubmit";

    /// All valid hook event names as a slice
    pub const ALL_EVENTS: &[&str] = &[
        PRE_TOOL_USE,
        POST_TOOL_USE,
        STOP,
        SUBAGENT_STOP,
        SESSION_START,
        USER_PROMPT_SUBMIT,
    ];
}

/// Strongly-typed enum for the six host hook events
///
/// Prefer this over raw strings wherever possible; the wire string is only
/// reconstructed at the serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HookEvent {
    /// Runs before a tool executes; may veto the call
    PreToolUse,
    /// Runs after a tool completed
    PostToolUse,
    /// Main agent finished responding
    Stop,
    /// A Task-tool subagent finished
    SubagentStop,
    /// New or resumed session
    SessionStart,
    /// User submitted a prompt
    UserPromptSubmit,
}

impl HookEvent {
    /// Get all hook events
    pub const fn all() -> &'static [HookEvent] {
        &[
            HookEvent::PreToolUse,
            HookEvent::PostToolUse,
            HookEvent::Stop,
            HookEvent::SubagentStop,
            HookEvent::SessionStart,
            HookEvent::UserPromptSubmit,
        ]
    }

    /// Parse hook event from its wire name (fallible)
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            event_constants::PRE_TOOL_USE => Some(HookEvent::PreToolUse),
            event_constants::POST_TOOL_USE => Some(HookEvent::PostToolUse),
            event_constants::STOP => Some(HookEvent::Stop),
            event_constants::SUBAGENT_STOP => Some(HookEvent::SubagentStop),
            event_constants::SESSION_START => Some(HookEvent::SessionStart),
            event_constants::USER_PROMPT_SUBMIT => Some(HookEvent::UserPromptSubmit),
            _ => None,
        }
    }

    /// Get the wire name
    pub const fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => event_constants::PRE_TOOL_USE,
            HookEvent::PostToolUse => event_constants::POST_TOOL_USE,
            HookEvent::Stop => event_constants::STOP,
            HookEvent::SubagentStop => event_constants::SUBAGENT_STOP,
            HookEvent::SessionStart => event_constants::SESSION_START,
            HookEvent::UserPromptSubmit => event_constants::USER_PROMPT_SUBMIT,
        }
    }

    /// Check if this event carries a `tool_name` the matcher applies to
    pub const fn is_tool_event(&self) -> bool {
        matches!(self, HookEvent::PreToolUse | HookEvent::PostToolUse)
    }

    /// Check if this is one of the stop events (loop-prevention applies)
    pub const fn is_stop_event(&self) -> bool {
        matches!(self, HookEvent::Stop | HookEvent::SubagentStop)
    }

    /// Check if this event accepts `additionalContext` injection
    pub const fn supports_injection(&self) -> bool {
        matches!(self, HookEvent::UserPromptSubmit | HookEvent::SessionStart)
    }
}

impl Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HookEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::try_from_str(s).ok_or_else(|| format!("Invalid hook event: {s}"))
    }
}

impl TryFrom<&str> for HookEvent {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_constants_are_valid() {
        for &event_str in event_constants::ALL_EVENTS {
            assert!(HookEvent::try_from_str(event_str).is_some());
        }
    }

    #[test]
    fn test_enum_string_roundtrip() {
        for event in HookEvent::all() {
            let string = event.as_str();
            let parsed = HookEvent::try_from_str(string).unwrap();
            assert_eq!(*event, parsed);
        }
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        assert_eq!(HookEvent::PreToolUse.to_string(), "PreToolUse");
        assert_eq!(HookEvent::UserPromptSubmit.to_string(), "UserPromptSubmit");
        assert_eq!(format!("{}", HookEvent::SubagentStop), "SubagentStop");
    }

    #[test]
    fn test_classification() {
        assert!(HookEvent::PreToolUse.is_tool_event());
        assert!(!HookEvent::Stop.is_tool_event());

        assert!(HookEvent::Stop.is_stop_event());
        assert!(HookEvent::SubagentStop.is_stop_event());
        assert!(!HookEvent::SessionStart.is_stop_event());

        assert!(HookEvent::UserPromptSubmit.supports_injection());
        assert!(HookEvent::SessionStart.supports_injection());
        assert!(!HookEvent::PostToolUse.supports_injection());
    }

    #[test]
    fn test_invalid_event() {
        assert!(HookEvent::try_from_str("pre_tool_use").is_none());
        assert!(HookEvent::try_from_str("").is_none());
    }
}
