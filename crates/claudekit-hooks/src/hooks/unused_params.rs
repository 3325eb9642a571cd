//! check-unused-parameters: catch `foo` → `_foo` parameter renames
//!
//! Underscore-prefixing a parameter silences the unused-variable lint
//! without answering the real question: why is it unused? When an edit
//! renames a parameter to its underscored twin inside a signature, advise
//! removing it instead.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use claudekit_core::Result;

use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};
use crate::io::EditOperation;

/// Parameter lists of declarations, arrows, methods, and constructors:
/// the `( … )` group directly followed by `{`, `=>`, or a return type.
static SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^()]*)\)\s*(?::[^={;]+)?\s*(?:=>|\{)").expect("valid regex")
});

/// Leading identifier of one parameter entry.
static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\.\.\.)?([A-Za-z_$][A-Za-z0-9_$]*)").expect("valid regex"));

pub struct CheckUnusedParameters;

#[async_trait]
impl Hook for CheckUnusedParameters {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let ops = ctx.payload.edit_operations();
        if ops.is_empty() {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }

        let mut renamed: Vec<String> = Vec::new();
        for op in &ops {
            renamed.extend(underscore_renames(op));
        }
        if renamed.is_empty() {
            return Ok(Outcome::Allow);
        }

        renamed.sort();
        renamed.dedup();
        let reason = format!(
            "Parameters renamed to underscore-prefixed forms instead of being removed: {}.\n\n\
             An unused parameter should usually be deleted from the signature (and its call \
             sites updated); prefixing it with `_` only hides the warning.",
            renamed
                .iter()
                .map(|r| format!("`{r}`"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Outcome::block(reason))
    }
}

fn signature_params(text: &str) -> Vec<String> {
    let mut params = Vec::new();
    for cap in SIGNATURE.captures_iter(text) {
        for entry in cap[1].split(',') {
            if let Some(name) = PARAM_NAME.captures(entry) {
                params.push(name[1].to_string());
            }
        }
    }
    params
}

/// Parameter names that appear as `foo` in the old signature and `_foo` in
/// the new one.
pub fn underscore_renames(op: &EditOperation) -> Vec<String> {
    let old_params = signature_params(&op.old_string);
    if old_params.is_empty() {
        return Vec::new();
    }
    signature_params(&op.new_string)
        .into_iter()
        .filter_map(|new_name| {
            let bare = new_name.strip_prefix('_')?;
            if !bare.is_empty()
                && old_params.iter().any(|o| o == bare)
                && !old_params.iter().any(|o| o == &new_name)
            {
                Some(format!("{bare} -> {new_name}"))
            } else {
                None
            }
        })
        .collect()
}
