//! self-review: prompt a structured review after code changes
//!
//! Emits one block message carrying the review marker and a question per
//! focus area, but only when code files changed since the last marker.
//! Question selection is deterministic: the count of prior markers indexes
//! into each area's list, so re-runs rotate without randomness.

use async_trait::async_trait;
use serde::Deserialize;

use claudekit_core::Result;
use claudekit_core::constants::SELF_REVIEW_MARKER;

use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};

#[derive(Debug, Clone, Deserialize)]
pub struct FocusArea {
    pub name: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelfReviewConfig {
    pub timeout: Option<u64>,
    pub target_patterns: Option<Vec<String>>,
    pub focus_areas: Option<Vec<FocusArea>>,
}

/// Code files worth reviewing; generated trees and tests are carved out.
pub fn default_target_patterns() -> Vec<String> {
    [
        "**/*.ts",
        "**/*.tsx",
        "**/*.js",
        "**/*.jsx",
        "**/*.mjs",
        "**/*.cjs",
        "!**/*.test.*",
        "!**/*.spec.*",
        "!**/node_modules/**",
        "!**/dist/**",
        "!**/build/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_focus_areas() -> Vec<FocusArea> {
    let area = |name: &str, questions: &[&str]| FocusArea {
        name: name.to_string(),
        questions: questions.iter().map(|q| q.to_string()).collect(),
    };
    vec![
        area(
            "Completeness",
            &[
                "Are all the edge cases from the original request actually handled?",
                "Is anything still stubbed, hard-coded, or left as a placeholder?",
                "Would this change survive an empty, huge, or malformed input?",
            ],
        ),
        area(
            "Integration",
            &[
                "Do the callers of the changed code still behave correctly?",
                "Were related configs, types, or docs updated to match?",
                "Does this duplicate logic that already exists elsewhere?",
            ],
        ),
        area(
            "Quality",
            &[
                "Would the error messages make sense to someone seeing them cold?",
                "Are the new names consistent with the surrounding code?",
                "Is there a simpler shape for what was just written?",
            ],
        ),
    ]
}

pub struct SelfReview;

#[async_trait]
impl Hook for SelfReview {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let Some(transcript) = ctx.transcript() else {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        };
        let cfg: SelfReviewConfig = ctx.hook_config();
        let patterns = cfg.target_patterns.unwrap_or_else(default_target_patterns);

        if !transcript.has_file_changes_since_marker(SELF_REVIEW_MARKER, &patterns) {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }

        let areas = cfg.focus_areas.unwrap_or_else(default_focus_areas);
        // Each emitted review leaves one marker behind; the count rotates
        // the questions deterministically.
        let rotation = transcript.count_marker(SELF_REVIEW_MARKER);
        Ok(Outcome::block(review_message(&areas, rotation)))
    }
}

/// Build the review message. `rotation` picks one question per area.
pub fn review_message(areas: &[FocusArea], rotation: usize) -> String {
    let mut message = format!("{SELF_REVIEW_MARKER}\n\nBefore finishing, review the changes:\n");
    for area in areas {
        if area.questions.is_empty() {
            continue;
        }
        let question = &area.questions[rotation % area.questions.len()];
        message.push_str(&format!("\n- **{}**: {question}", area.name));
    }
    message
}
