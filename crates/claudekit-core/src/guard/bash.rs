//! Bash command parsing for the file guard
//!
//! Extracts filesystem path candidates from a shell command line without
//! executing anything. This is deliberately not a shell: only the surface
//! needed to find file candidates is recognized — quoting, redirections,
//! pipelines, command substitution, heredocs, `xargs`, and `find -exec`.
//! Ambiguous tokens produce no candidate; the guard never turns ambiguity
//! into a denial.
//!
//! Git revision syntax (`A..B`, `HEAD~2`, `@{u}`, `origin/main`) is excluded
//! from candidates inside `git` invocations so ref arguments never trip path
//! rules.

use once_cell::sync::Lazy;
use regex::Regex;

/// How a candidate path is used by the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Read,
    Write,
    Exec,
}

/// A token that resolved to a filesystem path candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCandidate {
    pub path: String,
    pub role: PathRole,
}

/// Commands whose positional arguments are written rather than read.
const WRITE_COMMANDS: &[&str] = &["tee", "touch", "truncate"];

/// Ref-range syntax: `A..B`, `A...B`, `..B`, `A..`
static GIT_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s]*\.\.\.?[^\s]*$").expect("valid regex"));

/// `HEAD`, `HEAD~2`, `HEAD^^`, `HEAD@{upstream}`
static GIT_HEAD_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(HEAD|FETCH_HEAD|ORIG_HEAD|MERGE_HEAD)([~^][0-9]*)*(@\{[^}]*\})?$").expect("valid regex"));

/// `@`, `@{u}`, `@{upstream}`, `@{-1}`
static GIT_AT_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(\{[^}]*\})?$").expect("valid regex"));

/// `origin/main`-style remote refs: slash-separated, no leading dot, no
/// file-extension dot anywhere. `src/main.rs` keeps its dot and stays a path.
static GIT_REMOTE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*(/[A-Za-z0-9_-]+)+$").expect("valid regex"));

/// Sensitive-content exfiltration heuristics, checked independently of the
/// ignore rules.
static EXFILTRATION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let sensitive = r"(\.env\b|\.pem\b|\.key\b|id_rsa|id_ed25519|credentials)";
    vec![
        (
            Regex::new(&format!(
                r"curl\b[^|;]*(-d|--data[a-z-]*|-F|--form)\s+@\S*{sensitive}"
            ))
            .expect("valid regex"),
            "uploads a sensitive file with curl",
        ),
        (
            Regex::new(&format!(r"\b(nc|ncat|netcat)\b[^|;]*<\s*\S*{sensitive}"))
                .expect("valid regex"),
            "pipes a sensitive file to a raw socket",
        ),
        (
            Regex::new(&format!(r"\bscp\b\s+\S*{sensitive}\S*\s+\S+@\S+:"))
                .expect("valid regex"),
            "copies a sensitive file to a remote host",
        ),
        (
            Regex::new(&format!(
                r"\b(cat|head|tail)\b\s+\S*{sensitive}\S*\s*\|\s*(curl|nc|ncat|ssh|wget)\b"
            ))
            .expect("valid regex"),
            "pipes a sensitive file to a network command",
        ),
    ]
});

/// Check a command line against the exfiltration heuristics.
pub fn flag_sensitive_exfiltration(command: &str) -> Option<&'static str> {
    EXFILTRATION_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(command))
        .map(|(_, reason)| *reason)
}

/// Whether a token is git revision syntax rather than a path.
pub fn is_git_revision(token: &str) -> bool {
    if token.contains("..") && GIT_RANGE.is_match(token) {
        return true;
    }
    GIT_HEAD_REF.is_match(token) || GIT_AT_REF.is_match(token) || GIT_REMOTE_REF.is_match(token)
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Pipe,
    Separator,
    RedirectOut,
    RedirectIn,
    Heredoc,
}

/// Tokenize one command line. Quotes group, operators split, command
/// substitution bodies are flattened in place and re-parsed by the caller.
fn tokenize(command: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = command.chars().peekable();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    word.push(q);
                }
            }
            '"' => {
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                word.push(escaped);
                            }
                        }
                        _ => word.push(q),
                    }
                }
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
            ' ' | '\t' | '\n' => flush(&mut word, &mut tokens),
            '|' => {
                flush(&mut word, &mut tokens);
                if chars.peek() == Some(&'|') {
                    chars.next();
                    tokens.push(Token::Separator);
                } else {
                    tokens.push(Token::Pipe);
                }
            }
            ';' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Separator);
            }
            '&' => {
                flush(&mut word, &mut tokens);
                if chars.peek() == Some(&'&') {
                    chars.next();
                }
                tokens.push(Token::Separator);
            }
            '>' => {
                flush(&mut word, &mut tokens);
                if chars.peek() == Some(&'>') {
                    chars.next();
                }
                // fd-duplication (`2>&1`) is not a file target
                if chars.peek() == Some(&'&') {
                    chars.next();
                    chars.next();
                } else {
                    tokens.push(Token::RedirectOut);
                }
            }
            '<' => {
                flush(&mut word, &mut tokens);
                if chars.peek() == Some(&'<') {
                    chars.next();
                    if chars.peek() == Some(&'-') {
                        chars.next();
                    }
                    tokens.push(Token::Heredoc);
                } else {
                    tokens.push(Token::RedirectIn);
                }
            }
            '`' => {
                flush(&mut word, &mut tokens);
                let mut inner = String::new();
                for q in chars.by_ref() {
                    if q == '`' {
                        break;
                    }
                    inner.push(q);
                }
                tokens.push(Token::Separator);
                tokens.extend(tokenize(&inner));
                tokens.push(Token::Separator);
            }
            '$' if chars.peek() == Some(&'(') => {
                flush(&mut word, &mut tokens);
                chars.next();
                let mut inner = String::new();
                let mut depth = 1usize;
                for q in chars.by_ref() {
                    match q {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    inner.push(q);
                }
                tokens.push(Token::Separator);
                tokens.extend(tokenize(&inner));
                tokens.push(Token::Separator);
            }
            // A numeric fd prefix directly before a redirect (`2>`)
            '0'..='9' if word.is_empty() && matches!(chars.peek(), Some(&'>') | Some(&'<')) => {}
            _ => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

/// Whether a word plausibly names a filesystem path.
///
/// Generous on purpose: a candidate that matches no protection rule is
/// harmless, while a missed sensitive file is not. Flags, URLs, and bare
/// words without path texture are excluded.
fn looks_like_path(word: &str) -> bool {
    if word.is_empty() || word.starts_with('-') || word == "." {
        return false;
    }
    if word.contains("://") {
        return false;
    }
    // Unresolvable expansions produce no candidate, except $HOME which the
    // resolver rewrites to the home directory
    if word.contains('$') && !word.starts_with("$HOME/") {
        return false;
    }
    word.contains('/') || word.starts_with('~') || word.starts_with('.') || word.contains('.')
}

/// Extract path candidates from a command line.
pub fn extract_path_candidates(command: &str) -> Vec<PathCandidate> {
    let tokens = tokenize(command);
    let mut candidates: Vec<PathCandidate> = Vec::new();
    let mut push = |path: &str, role: PathRole| {
        let candidate = PathCandidate {
            path: path.to_string(),
            role,
        };
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    let mut at_command = true;
    let mut command_name = String::new();
    let mut pending_redirect: Option<PathRole> = None;
    let mut skip_next_word = false; // heredoc delimiters
    let mut find_exec_depth = false;
    let mut find_saw_primary = false;

    for token in &tokens {
        match token {
            Token::Pipe | Token::Separator => {
                at_command = true;
                command_name.clear();
                pending_redirect = None;
                find_exec_depth = false;
                find_saw_primary = false;
            }
            Token::RedirectOut => pending_redirect = Some(PathRole::Write),
            Token::RedirectIn => pending_redirect = Some(PathRole::Read),
            Token::Heredoc => skip_next_word = true,
            Token::Word(word) => {
                if skip_next_word {
                    skip_next_word = false;
                    continue;
                }
                if let Some(role) = pending_redirect.take() {
                    if looks_like_path(word) || !word.starts_with('-') {
                        push(word, role);
                    }
                    continue;
                }
                if at_command {
                    at_command = false;
                    command_name = word.clone();
                    if word.contains('/') {
                        push(word, PathRole::Exec);
                    }
                    continue;
                }
                // `xargs cmd args…` / `find … -exec cmd args…`: the wrapped
                // command starts a fresh invocation
                if command_name == "xargs" && !word.starts_with('-') {
                    command_name = word.clone();
                    continue;
                }
                if command_name == "find" {
                    if word == "-exec" || word == "-execdir" || word == "-ok" {
                        find_exec_depth = true;
                        continue;
                    }
                    if find_exec_depth {
                        // The wrapped command's own arguments may be paths
                        if word == ";" || word == "+" || word == "{}" {
                            continue;
                        }
                        if looks_like_path(word) {
                            push(word, PathRole::Read);
                        }
                        continue;
                    }
                    if word.starts_with('-') {
                        // Primaries like `-name '*.pem'` take pattern values,
                        // not paths; stop collecting start points here
                        find_saw_primary = true;
                        continue;
                    }
                    if find_saw_primary {
                        continue;
                    }
                    if word != "." {
                        push(word, PathRole::Read);
                    }
                    continue;
                }
                if word == "{}" || word == ";" {
                    continue;
                }
                if command_name == "git" && is_git_revision(word) {
                    continue;
                }
                if !word.starts_with('-') && looks_like_path(word) {
                    let role = if WRITE_COMMANDS.contains(&command_name.as_str()) {
                        PathRole::Write
                    } else {
                        PathRole::Read
                    };
                    push(word, role);
                }
            }
        }
    }
    candidates
}
