//! Hook payload types compatible with the host's JSON format
//!
//! Every field is optional: the payload reader degrades a malformed or
//! missing payload to `HookPayload::default()` and hooks decide what absence
//! means. Serde aliases absorb the casing differences between host versions
//! (`hook_event_name` vs `hookEventName`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use claudekit_core::HookEvent;

/// Hook input message from the host.
///
/// # Example
///
/// ```
/// use claudekit_hooks::io::HookPayload;
/// use serde_json::json;
///
/// let json = json!({
///     "session_id": "sess_123",
///     "transcript_path": "/tmp/transcript.jsonl",
///     "cwd": "/workspace",
///     "hook_event_name": "PreToolUse",
///     "tool_name": "Bash",
///     "tool_input": {"command": "ls"}
/// });
///
/// let payload: HookPayload = serde_json::from_value(json).unwrap();
/// assert_eq!(payload.tool_name.as_deref(), Some("Bash"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookPayload {
    /// Hook event type (CamelCase wire names: PreToolUse, Stop, …)
    #[serde(default, alias = "hookEventName")]
    pub hook_event_name: Option<String>,

    /// Unique session identifier from the host
    #[serde(default, alias = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Path to the conversation transcript file
    #[serde(default, alias = "transcriptPath", skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<PathBuf>,

    /// Current working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    // ===== Tool-related fields (PreToolUse, PostToolUse) =====
    /// Name of the tool being called; absence means universal
    #[serde(default, alias = "toolName", skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Tool input parameters (tool-specific JSON)
    #[serde(default, alias = "toolInput", skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Value>,

    /// Tool execution result (PostToolUse only)
    #[serde(default, alias = "toolResponse", skip_serializing_if = "Option::is_none")]
    pub tool_response: Option<Value>,

    // ===== UserPromptSubmit field =====
    /// User's prompt text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    // ===== Stop/SubagentStop field =====
    /// Loop-prevention flag: a stop hook continuation is already active
    #[serde(default, alias = "stopHookActive", skip_serializing_if = "Option::is_none")]
    pub stop_hook_active: Option<bool>,

    // ===== SessionStart field =====
    /// Session source ("startup", "resume", or "clear")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// One old→new substitution from an Edit or MultiEdit tool call.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EditOperation {
    #[serde(default)]
    pub old_string: String,
    #[serde(default)]
    pub new_string: String,
    /// Present when the host sends per-edit file paths
    #[serde(default)]
    pub file_path: Option<String>,
}

impl HookPayload {
    /// The strongly-typed event, when the payload names a known one.
    pub fn event(&self) -> Option<HookEvent> {
        self.hook_event_name
            .as_deref()
            .and_then(HookEvent::try_from_str)
    }

    /// Tool name, defaulting to empty (which matchers treat as universal).
    pub fn tool(&self) -> &str {
        self.tool_name.as_deref().unwrap_or("")
    }

    fn input_str(&self, key: &str) -> Option<&str> {
        self.tool_input.as_ref()?.get(key)?.as_str()
    }

    /// `tool_input.file_path` (or `notebook_path`), when present.
    pub fn file_path(&self) -> Option<&str> {
        self.input_str("file_path").or_else(|| self.input_str("notebook_path"))
    }

    /// `tool_input.command` for Bash tool calls.
    pub fn command(&self) -> Option<&str> {
        self.input_str("command")
    }

    /// Whether the stop-loop flag is set.
    pub fn stop_loop_active(&self) -> bool {
        self.stop_hook_active == Some(true)
    }

    /// All edit operations carried by this tool call.
    ///
    /// `Edit` sends a single old/new pair at the top level, `MultiEdit` an
    /// `edits` array, `Write` a full-content write (old empty).
    pub fn edit_operations(&self) -> Vec<EditOperation> {
        let Some(input) = self.tool_input.as_ref() else {
            return Vec::new();
        };
        if let Some(edits) = input.get("edits").and_then(Value::as_array) {
            return edits
                .iter()
                .filter_map(|e| serde_json::from_value(e.clone()).ok())
                .collect();
        }
        if input.get("old_string").is_some() || input.get("new_string").is_some() {
            return vec![EditOperation {
                old_string: self.input_str("old_string").unwrap_or_default().to_string(),
                new_string: self.input_str("new_string").unwrap_or_default().to_string(),
                file_path: self.file_path().map(String::from),
            }];
        }
        if let Some(content) = self.input_str("content") {
            return vec![EditOperation {
                old_string: String::new(),
                new_string: content.to_string(),
                file_path: self.file_path().map(String::from),
            }];
        }
        Vec::new()
    }

    /// The content the file will hold after this tool call, as far as the
    /// payload can tell: written content, or the concatenated new strings.
    pub fn new_content(&self) -> Option<String> {
        let ops = self.edit_operations();
        if ops.is_empty() {
            return None;
        }
        Some(
            ops.iter()
                .map(|op| op.new_string.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Paths implicated by this tool call (direct and per-edit).
    pub fn candidate_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let Some(p) = self.file_path() {
            paths.push(p.to_string());
        }
        for op in self.edit_operations() {
            if let Some(p) = op.file_path
                && !paths.contains(&p)
            {
                paths.push(p);
            }
        }
        paths
    }

    /// Working directory to resolve project state against.
    pub fn working_dir(&self) -> PathBuf {
        self.cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
