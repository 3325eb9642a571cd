//! Ignore-rule merging and matching for the file guard
//!
//! Rules use gitignore grammar: one pattern per line, `#` comments, `!`
//! negation, leading `/` anchors to the project root, trailing `/` matches a
//! directory and everything under it, bare names match at any depth.
//!
//! Sources merge in a fixed order: built-in defaults first, then every
//! AI-ignore file found at the project root. Within the merged list the last
//! matching rule wins, so a later negation reintroduces a path an earlier
//! rule protected.

use std::path::Path;

use globset::{Glob, GlobMatcher};

use crate::constants::AI_IGNORE_FILES;

/// Built-in protected patterns: env files, private keys, cloud credentials,
/// SSH material. Template files are carved back out by the trailing
/// negations.
pub const DEFAULT_PATTERNS: &[&str] = &[
    ".env",
    ".env.*",
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
    "*.jks",
    "*.keystore",
    "*.ppk",
    "id_rsa*",
    "id_dsa*",
    "id_ecdsa*",
    "id_ed25519*",
    ".ssh/",
    ".aws/",
    ".azure/",
    ".config/gcloud/",
    "credentials.json",
    "service-account*.json",
    "*.tfstate",
    "*.tfstate.*",
    "!.env.example",
    "!.env.template",
    "!.env.sample",
];

/// One compiled rule. A rule may expand to several glob matchers (anchored
/// and any-depth variants); the rule matches when any of them do.
pub struct CompiledRule {
    raw: String,
    negated: bool,
    matchers: Vec<GlobMatcher>,
}

impl CompiledRule {
    fn matches(&self, rel_path: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(rel_path))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_negation(&self) -> bool {
        self.negated
    }
}

/// The merged, ordered rule set for one project.
#[derive(Default)]
pub struct GuardRules {
    rules: Vec<CompiledRule>,
}

/// Decision for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// No rule matched, or the last matching rule was a negation
    Allowed,
    /// The last matching rule protects the path
    Protected { pattern: String },
}

impl GuardRules {
    /// Only the built-in defaults.
    pub fn defaults() -> Self {
        let mut rules = Self::default();
        for pattern in DEFAULT_PATTERNS {
            rules.push_pattern(pattern);
        }
        rules
    }

    /// Defaults plus every AI-ignore file present at `project_root`, in the
    /// documented merge order.
    pub fn load(project_root: &Path) -> Self {
        let mut rules = Self::defaults();
        for file in AI_IGNORE_FILES {
            let path = project_root.join(file);
            if let Ok(raw) = std::fs::read_to_string(&path) {
                tracing::debug!("merging ignore rules from {}", path.display());
                rules.merge_text(&raw);
            }
        }
        rules
    }

    /// Append all patterns from one ignore-file body.
    pub fn merge_text(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.push_pattern(line);
        }
    }

    /// Append a single pattern.
    pub fn push_pattern(&mut self, raw: &str) {
        let (body, negated) = match raw.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        let Some(matchers) = compile_gitignore_pattern(body) else {
            tracing::warn!("ignoring invalid pattern '{raw}'");
            return;
        };
        self.rules.push(CompiledRule {
            raw: raw.to_string(),
            negated,
            matchers,
        });
    }

    /// Decide a project-relative path against the ordered rules.
    /// Last match wins; negations reintroduce.
    pub fn decide(&self, rel_path: &str) -> GuardDecision {
        let rel_path = rel_path.trim_start_matches("./");
        let mut decision = GuardDecision::Allowed;
        for rule in &self.rules {
            if rule.matches(rel_path) {
                decision = if rule.negated {
                    GuardDecision::Allowed
                } else {
                    GuardDecision::Protected {
                        pattern: rule.raw.clone(),
                    }
                };
            }
        }
        decision
    }

    /// Shorthand used by tests and the bash-command screening.
    pub fn is_protected(&self, rel_path: &str) -> bool {
        matches!(self.decide(rel_path), GuardDecision::Protected { .. })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Expand one gitignore pattern body into glob matchers.
///
/// Returns `None` when the glob does not compile.
fn compile_gitignore_pattern(body: &str) -> Option<Vec<GlobMatcher>> {
    let mut body = body.trim().to_string();
    if body.is_empty() {
        return None;
    }

    let dir_only = body.ends_with('/');
    if dir_only {
        body.pop();
    }

    // Leading slash anchors to the root; otherwise a pattern without an
    // internal slash matches at any depth.
    let anchored = body.starts_with('/');
    let body = body.trim_start_matches('/');
    let any_depth = !anchored && !body.contains('/');

    let mut variants = Vec::new();
    if dir_only {
        variants.push(format!("{body}/**"));
        variants.push(body.to_string());
    } else {
        variants.push(body.to_string());
        // A name pattern also protects everything under a matching directory
        variants.push(format!("{body}/**"));
    }
    if any_depth {
        for v in variants.clone() {
            variants.push(format!("**/{v}"));
        }
    }

    let mut matchers = Vec::with_capacity(variants.len());
    for v in &variants {
        matchers.push(Glob::new(v).ok()?.compile_matcher());
    }
    Some(matchers)
}
