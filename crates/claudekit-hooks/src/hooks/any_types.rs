//! check-any-changed: forbid `any` types in edited TypeScript
//!
//! Scans the content an edit introduces for `any`-type patterns after
//! stripping strings and comments, so `// allows any value` and
//! `"any string"` never trip it. Test files and declaration files are
//! exempt.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use claudekit_core::Result;

use crate::hooks::project::has_extension;
use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts"];
const EXEMPT_SUFFIXES: &[&str] = &[".test.ts", ".test.tsx", ".spec.ts", ".spec.tsx", ".d.ts"];

static ANY_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r":\s*any\b").expect("valid regex"), ": any"),
        (Regex::new(r":\s*any\[\]").expect("valid regex"), ": any[]"),
        (Regex::new(r"<any>").expect("valid regex"), "<any>"),
        (Regex::new(r"\bas\s+any\b").expect("valid regex"), "as any"),
        (Regex::new(r"=\s*any\b").expect("valid regex"), "= any"),
    ]
});

pub struct CheckAnyChanged;

#[async_trait]
impl Hook for CheckAnyChanged {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let Some(path) = ctx.payload.file_path().map(String::from) else {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        };
        if !has_extension(&path, TS_EXTENSIONS) || EXEMPT_SUFFIXES.iter().any(|s| path.ends_with(s))
        {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        let Some(content) = ctx.payload.new_content() else {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        };

        let findings = scan_for_any(&content);
        if findings.is_empty() {
            return Ok(Outcome::Allow);
        }

        let mut reason = format!(
            "Forbidden `any` types in {path}:\n\n{}",
            findings
                .iter()
                .map(|f| format!("  line {}: {} ({})", f.line, f.text.trim(), f.pattern))
                .collect::<Vec<_>>()
                .join("\n")
        );
        reason.push_str(
            "\n\nReplace `any` with a concrete type, a generic parameter, or `unknown` with narrowing.",
        );
        Ok(Outcome::block(reason))
    }
}

/// One `any` occurrence with its evidence line.
#[derive(Debug, PartialEq)]
pub struct AnyFinding {
    pub line: usize,
    pub text: String,
    pub pattern: &'static str,
}

/// Scan TypeScript content for `any` patterns outside strings and comments.
pub fn scan_for_any(content: &str) -> Vec<AnyFinding> {
    let stripped = strip_strings_and_comments(content);
    let mut findings = Vec::new();
    for (idx, (stripped_line, original_line)) in
        stripped.lines().zip(content.lines()).enumerate()
    {
        for (regex, label) in ANY_PATTERNS.iter() {
            if regex.is_match(stripped_line) {
                findings.push(AnyFinding {
                    line: idx + 1,
                    text: original_line.to_string(),
                    pattern: label,
                });
                break; // one finding per line is enough evidence
            }
        }
    }
    findings
}

#[derive(Clone, Copy, PartialEq)]
enum ScanState {
    Code,
    LineComment,
    BlockComment,
    Single,
    Double,
    Template,
}

/// Replace string and comment contents with spaces, preserving line
/// structure so findings keep their line numbers.
pub fn strip_strings_and_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut state = ScanState::Code;
    let chars: Vec<char> = content.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            ScanState::Code => match (c, next) {
                ('/', Some('/')) => {
                    state = ScanState::LineComment;
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                ('/', Some('*')) => {
                    state = ScanState::BlockComment;
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                ('\'', _) => {
                    state = ScanState::Single;
                    out.push(' ');
                }
                ('"', _) => {
                    state = ScanState::Double;
                    out.push(' ');
                }
                ('`', _) => {
                    state = ScanState::Template;
                    out.push(' ');
                }
                _ => out.push(c),
            },
            ScanState::LineComment => {
                if c == '\n' {
                    state = ScanState::Code;
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            ScanState::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = ScanState::Code;
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                out.push(if c == '\n' { '\n' } else { ' ' });
            }
            ScanState::Single | ScanState::Double | ScanState::Template => {
                let quote = match state {
                    ScanState::Single => '\'',
                    ScanState::Double => '"',
                    _ => '`',
                };
                if c == '\\' {
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                if c == quote {
                    state = ScanState::Code;
                    out.push(' ');
                } else if c == '\n' {
                    // Unterminated single/double strings end at the newline
                    if state != ScanState::Template {
                        state = ScanState::Code;
                    }
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
        }
        i += 1;
    }
    out
}
