//! Conversation transcript parsing
//!
//! The host maintains an append-only JSONL transcript per session. Every
//! query here is read-only and tolerant: a truncated or garbage trailing line
//! (the host may be mid-write) is skipped, never fatal.
//!
//! The grouping rule must match the host UI: a text record starts a new UI
//! message, a tool-only record fuses into the preceding message of the same
//! role, and a tool-only record with no same-role predecessor stands alone.
//! Hooks that reason about "the last N messages" count these groups, not raw
//! records.

use std::path::Path;

use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{MAX_TRANSCRIPT_BYTES, SELF_REVIEW_LOOKBACK};
use crate::error::{Result, TranscriptError};

/// Tool names whose use modifies files on disk.
const FILE_MODIFYING_TOOLS: &[&str] = &["Write", "Edit", "MultiEdit", "NotebookEdit"];

/// One line of the transcript.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptRecord {
    /// Record kind: `user`, `assistant`, or `system`
    #[serde(rename = "type")]
    pub record_type: Option<String>,

    /// The message payload, when present
    pub message: Option<TranscriptMessage>,

    /// ISO-8601 timestamp written by the host
    pub timestamp: Option<String>,

    /// Set by the host on records belonging to a subagent sidechain
    #[serde(rename = "isSidechain", alias = "is_sidechain")]
    pub is_sidechain: Option<bool>,
}

/// Message payload of a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptMessage {
    pub role: Option<String>,
    pub content: Option<MessageContent>,
}

/// Content is either a bare string or an array of typed parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single content part inside an array-form message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        #[serde(default)]
        input: Value,
    },

    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        content: Value,
    },

    /// Thinking blocks, images, and anything future hosts add
    #[serde(other)]
    Other,
}

/// One todo entry from the latest TodoWrite tool use.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TodoItem {
    pub content: String,
    #[serde(default)]
    pub status: String,
}

/// A host-UI message: one or more fused records of the same role.
#[derive(Debug)]
pub struct UiMessage {
    pub role: String,
    /// Indices into the record list, in order
    pub records: Vec<usize>,
}

impl TranscriptRecord {
    fn role(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.role.as_deref())
            .or(self.record_type.as_deref())
    }

    fn parts(&self) -> &[ContentPart] {
        match self.message.as_ref().and_then(|m| m.content.as_ref()) {
            Some(MessageContent::Parts(parts)) => parts,
            _ => &[],
        }
    }

    fn has_text(&self) -> bool {
        match self.message.as_ref().and_then(|m| m.content.as_ref()) {
            Some(MessageContent::Text(t)) => !t.trim().is_empty(),
            Some(MessageContent::Parts(parts)) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::Text { text } if !text.trim().is_empty())),
            None => false,
        }
    }

    fn has_tool_parts(&self) -> bool {
        self.parts()
            .iter()
            .any(|p| matches!(p, ContentPart::ToolUse { .. } | ContentPart::ToolResult { .. }))
    }

    /// Concatenated searchable text: text parts plus stringified tool
    /// results. Marker searches look in both.
    fn searchable_text(&self) -> String {
        match self.message.as_ref().and_then(|m| m.content.as_ref()) {
            Some(MessageContent::Text(t)) => t.clone(),
            Some(MessageContent::Parts(parts)) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        ContentPart::Text { text } => {
                            out.push_str(text);
                            out.push('\n');
                        }
                        ContentPart::ToolResult { content } => {
                            append_result_text(content, &mut out);
                        }
                        _ => {}
                    }
                }
                out
            }
            None => String::new(),
        }
    }

    /// File paths touched by file-modifying tool uses in this record.
    fn modified_file_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for part in self.parts() {
            if let ContentPart::ToolUse { name, input } = part
                && FILE_MODIFYING_TOOLS.contains(&name.as_str())
            {
                for key in ["file_path", "notebook_path"] {
                    if let Some(p) = input.get(key).and_then(Value::as_str) {
                        paths.push(p.to_string());
                    }
                }
            }
        }
        paths
    }
}

fn append_result_text(content: &Value, out: &mut String) {
    match content {
        Value::String(s) => {
            out.push_str(s);
            out.push('\n');
        }
        Value::Array(items) => {
            for item in items {
                if let Some(s) = item.get("text").and_then(Value::as_str) {
                    out.push_str(s);
                    out.push('\n');
                }
            }
        }
        _ => {}
    }
}

/// Parsed transcript with query helpers.
#[derive(Debug, Default)]
pub struct Transcript {
    records: Vec<TranscriptRecord>,
}

impl Transcript {
    /// Load a transcript, skipping malformed lines.
    ///
    /// Files above the size cap are rejected rather than truncated halfway
    /// through a record.
    pub fn load(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|_| TranscriptError::NotFound {
            path: path.display().to_string(),
        })?;
        if meta.len() > MAX_TRANSCRIPT_BYTES {
            return Err(TranscriptError::TooLarge {
                size: meta.len(),
                cap: MAX_TRANSCRIPT_BYTES,
            }
            .into());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::parse(&raw))
    }

    /// Parse transcript text. Malformed lines (typically a truncated tail
    /// the host is still writing) are skipped.
    pub fn parse(raw: &str) -> Self {
        let records = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(rec) => Some(rec),
                Err(e) => {
                    tracing::debug!("skipping malformed transcript line: {e}");
                    None
                }
            })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[TranscriptRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Group records into host-UI messages.
    pub fn group_ui_messages(&self) -> Vec<UiMessage> {
        group_ui_messages(&self.records)
    }

    /// File paths referenced by file-modifying tool uses within the last
    /// `limit` records, most recent first, deduplicated.
    pub fn recent_file_paths(&self, limit: usize) -> Vec<String> {
        let start = self.records.len().saturating_sub(limit);
        let mut seen = Vec::new();
        for record in self.records[start..].iter().rev() {
            for path in record.modified_file_paths() {
                if !seen.contains(&path) {
                    seen.push(path);
                }
            }
        }
        seen
    }

    /// Index of the last record whose searchable content contains `marker`.
    ///
    /// Looks at user messages and the tool_result payloads embedded in them,
    /// plus assistant text (markers are emitted as block messages and echoed
    /// back as tool results).
    pub fn find_marker(&self, marker: &str) -> Option<usize> {
        self.records
            .iter()
            .rposition(|r| r.searchable_text().contains(marker))
    }

    /// Number of records whose searchable content contains `marker`.
    pub fn count_marker(&self, marker: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.searchable_text().contains(marker))
            .count()
    }

    /// Whether a file-modifying tool use matching `patterns` appears after
    /// the last occurrence of `marker`.
    ///
    /// Patterns use glob syntax; `!`-prefixed entries negate (last match
    /// wins). Without a marker, only the trailing lookback window is
    /// considered.
    pub fn has_file_changes_since_marker(&self, marker: &str, patterns: &[String]) -> bool {
        let start = match self.find_marker(marker) {
            Some(idx) => idx + 1,
            None => self.records.len().saturating_sub(SELF_REVIEW_LOOKBACK),
        };
        let matchers = compile_patterns(patterns);
        self.records[start..]
            .iter()
            .flat_map(|r| r.modified_file_paths())
            .any(|path| patterns_match(&matchers, &path))
    }

    /// Parse the most recent TodoWrite tool use into todo items.
    pub fn latest_todo_state(&self) -> Option<Vec<TodoItem>> {
        for record in self.records.iter().rev() {
            for part in record.parts() {
                if let ContentPart::ToolUse { name, input } = part
                    && name == "TodoWrite"
                    && let Some(todos) = input.get("todos")
                {
                    return serde_json::from_value(todos.clone()).ok();
                }
            }
        }
        None
    }

    /// Whether the current event originates from a subagent.
    pub fn subagent_context(&self) -> bool {
        is_subagent_context(&self.records)
    }
}

/// Pure grouping function; see the module docs for the rule.
pub fn group_ui_messages(records: &[TranscriptRecord]) -> Vec<UiMessage> {
    let mut groups: Vec<UiMessage> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let Some(role) = record.role() else { continue };
        if role == "system" {
            continue;
        }
        let tool_only = record.has_tool_parts() && !record.has_text();
        match groups.last_mut() {
            Some(last) if tool_only && last.role == role => last.records.push(idx),
            _ => groups.push(UiMessage {
                role: role.to_string(),
                records: vec![idx],
            }),
        }
    }
    groups
}

/// Subagent detection heuristic, isolated so the host protocol can change
/// without touching any hook: the host marks sidechain records explicitly,
/// so a sidechain marker in the trailing records decides.
pub fn is_subagent_context(records: &[TranscriptRecord]) -> bool {
    records
        .iter()
        .rev()
        .take(10)
        .any(|r| r.is_sidechain == Some(true))
}

struct PatternMatcher {
    matcher: GlobMatcher,
    negated: bool,
}

fn compile_patterns(patterns: &[String]) -> Vec<PatternMatcher> {
    patterns
        .iter()
        .filter_map(|raw| {
            let (pattern, negated) = match raw.strip_prefix('!') {
                Some(rest) => (rest, true),
                None => (raw.as_str(), false),
            };
            match Glob::new(pattern) {
                Ok(glob) => Some(PatternMatcher {
                    matcher: glob.compile_matcher(),
                    negated,
                }),
                Err(e) => {
                    tracing::warn!("ignoring invalid pattern '{raw}': {e}");
                    None
                }
            }
        })
        .collect()
}

/// Last-match-wins over the ordered pattern list.
fn patterns_match(matchers: &[PatternMatcher], path: &str) -> bool {
    let mut matched = false;
    for pm in matchers {
        if pm.matcher.is_match(path) {
            matched = !pm.negated;
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_record(role: &str, text: &str) -> String {
        format!(
            r#"{{"type":"{role}","message":{{"role":"{role}","content":[{{"type":"text","text":"{text}"}}]}}}}"#
        )
    }

    fn edit_record(path: &str) -> String {
        format!(
            r#"{{"type":"assistant","message":{{"role":"assistant","content":[{{"type":"tool_use","name":"Edit","input":{{"file_path":"{path}"}}}}]}}}}"#
        )
    }

    #[test]
    fn test_malformed_trailing_line_is_skipped() {
        let raw = format!("{}\n{}\n{{\"type\":\"assis", text_record("user", "hi"), text_record("assistant", "hello"));
        let t = Transcript::parse(&raw);
        assert_eq!(t.records().len(), 2);
    }

    #[test]
    fn test_grouping_fuses_tool_only_into_preceding_text() {
        let raw = [
            text_record("user", "please edit"),
            text_record("assistant", "editing now"),
            edit_record("src/a.ts"),
        ]
        .join("\n");
        let t = Transcript::parse(&raw);
        let groups = t.group_ui_messages();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].role, "assistant");
        assert_eq!(groups[1].records, vec![1, 2]);
    }

    #[test]
    fn test_grouping_standalone_tool_only_record() {
        let raw = [text_record("user", "go"), edit_record("src/a.ts")].join("\n");
        let t = Transcript::parse(&raw);
        let groups = t.group_ui_messages();
        // No preceding assistant text: the tool-only record stands alone
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].role, "assistant");
        assert_eq!(groups[1].records, vec![1]);
    }

    #[test]
    fn test_grouping_stable_under_trailing_perturbation() {
        let raw = [
            text_record("user", "go"),
            text_record("assistant", "ok"),
            edit_record("src/a.ts"),
        ]
        .join("\n");
        let baseline = Transcript::parse(&raw).group_ui_messages().len();
        let with_newline = format!("{raw}\n");
        let with_garbage = format!("{raw}\n{{\"type\":\"user\",\"mess");
        assert_eq!(Transcript::parse(&with_newline).group_ui_messages().len(), baseline);
        assert_eq!(Transcript::parse(&with_garbage).group_ui_messages().len(), baseline);
    }

    #[test]
    fn test_recent_file_paths_dedup_and_order() {
        let raw = [
            edit_record("src/a.ts"),
            edit_record("src/b.ts"),
            edit_record("src/a.ts"),
        ]
        .join("\n");
        let t = Transcript::parse(&raw);
        assert_eq!(t.recent_file_paths(10), vec!["src/a.ts", "src/b.ts"]);
        assert_eq!(t.recent_file_paths(1), vec!["src/a.ts"]);
    }

    #[test]
    fn test_find_marker_in_tool_result() {
        let raw = r#"{"type":"user","message":{"role":"user","content":[{"type":"tool_result","content":"saw 📋 **Self-Review** here"}]}}"#;
        let t = Transcript::parse(raw);
        assert_eq!(t.find_marker("📋 **Self-Review**"), Some(0));
        assert_eq!(t.find_marker("nope"), None);
    }

    #[test]
    fn test_changes_since_marker_respects_negation() {
        let raw = [
            text_record("user", "MARKER"),
            edit_record("src/a.test.ts"),
        ]
        .join("\n");
        let t = Transcript::parse(&raw);
        let patterns = vec!["**/*.ts".to_string(), "!**/*.test.ts".to_string()];
        assert!(!t.has_file_changes_since_marker("MARKER", &patterns));

        let raw = [text_record("user", "MARKER"), edit_record("src/a.ts")].join("\n");
        let t = Transcript::parse(&raw);
        assert!(t.has_file_changes_since_marker("MARKER", &patterns));
    }

    #[test]
    fn test_changes_before_marker_do_not_count() {
        let raw = [edit_record("src/a.ts"), text_record("user", "MARKER")].join("\n");
        let t = Transcript::parse(&raw);
        let patterns = vec!["**/*.ts".to_string()];
        assert!(!t.has_file_changes_since_marker("MARKER", &patterns));
    }

    #[test]
    fn test_latest_todo_state() {
        let raw = r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","name":"TodoWrite","input":{"todos":[{"content":"write tests","status":"completed"},{"content":"fix lint","status":"pending"}]}}]}}"#;
        let t = Transcript::parse(raw);
        let todos = t.latest_todo_state().unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[1].status, "pending");
    }

    #[test]
    fn test_subagent_detection() {
        let main = r#"{"type":"assistant","isSidechain":false,"message":{"role":"assistant","content":"hi"}}"#;
        let side = r#"{"type":"assistant","isSidechain":true,"message":{"role":"assistant","content":"hi"}}"#;
        assert!(!Transcript::parse(main).subagent_context());
        assert!(Transcript::parse(side).subagent_context());
    }

    #[test]
    fn test_unknown_content_part_tolerated() {
        let raw = r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"thinking","thinking":"hmm"},{"type":"text","text":"ok"}]}}"#;
        let t = Transcript::parse(raw);
        assert_eq!(t.records().len(), 1);
        assert!(t.records()[0].has_text());
    }
}
