//! Matcher grammar for tool-scoped hooks
//!
//! Precedence, first hit wins:
//! 1. `*` (or empty) — universal
//! 2. exact tool name
//! 3. comma- or pipe-joined alternation of exact names
//! 4. anchored regex
//!
//! A matcher that fails to compile as a regex matches nothing. Conditional
//! predicates on file paths are deliberately not part of the grammar; that
//! filtering belongs to the hooks themselves.

use regex::Regex;

/// Test a tool name against a matcher string.
pub fn matches_tool(matcher: &str, tool_name: &str) -> bool {
    let matcher = matcher.trim();
    if matcher.is_empty() || matcher == "*" {
        return true;
    }
    if matcher == tool_name {
        return true;
    }
    if matcher.contains(',') || matcher.contains('|') {
        let alternates = matcher
            .split([',', '|'])
            .map(str::trim)
            .filter(|a| !a.is_empty());
        for alternate in alternates {
            if alternate == tool_name || alternate == "*" {
                return true;
            }
        }
        // Pipe alternation may still be meant as a regex (e.g. `Edit.*|Write`)
        if !matcher.contains(['.', '^', '$', '(', '[', '+', '?', '\\']) {
            return false;
        }
    }
    match Regex::new(&format!("^(?:{matcher})$")) {
        Ok(re) => re.is_match(tool_name),
        Err(e) => {
            tracing::warn!("invalid matcher '{matcher}': {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal() {
        assert!(matches_tool("*", "Bash"));
        assert!(matches_tool("", "AnyTool"));
        assert!(matches_tool("  *  ", "Read"));
    }

    #[test]
    fn test_exact() {
        assert!(matches_tool("Edit", "Edit"));
        assert!(!matches_tool("Edit", "MultiEdit"));
        assert!(!matches_tool("edit", "Edit")); // case-sensitive
    }

    #[test]
    fn test_pipe_alternation() {
        assert!(matches_tool("Write|Edit|MultiEdit", "MultiEdit"));
        assert!(matches_tool("Write|Edit|MultiEdit", "Write"));
        assert!(!matches_tool("Write|Edit|MultiEdit", "Bash"));
    }

    #[test]
    fn test_comma_alternation() {
        assert!(matches_tool("Read, Write", "Write"));
        assert!(!matches_tool("Read, Write", "Edit"));
    }

    #[test]
    fn test_regex_fallback() {
        assert!(matches_tool("mcp__.*", "mcp__github__create_issue"));
        assert!(!matches_tool("mcp__.*", "Bash"));
        assert!(matches_tool("Edit.*|Write", "EditNotebook"));
    }

    #[test]
    fn test_regex_is_anchored() {
        // Substring matches are not enough
        assert!(!matches_tool("Edit", "NotebookEditCell"));
        assert!(!matches_tool("Ba.h", "xBash"));
    }

    #[test]
    fn test_invalid_regex_matches_nothing() {
        assert!(!matches_tool("(", "Bash"));
    }
}
