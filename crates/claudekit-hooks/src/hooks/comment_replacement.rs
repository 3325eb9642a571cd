//! check-comment-replacement: flag code replaced by commentary
//!
//! Deleting code is legal. Replacing a working region with lines of
//! comments ("// removed for now") loses the implementation while looking
//! like a refactor, so that substitution pattern is blocked. Documentation
//! files are exempt, and markdown-style `##` headings inside hash-comment
//! languages do not count as comments.

use async_trait::async_trait;

use claudekit_core::Result;

use crate::hooks::project::has_extension;
use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};
use crate::io::EditOperation;

const DOC_EXTENSIONS: &[&str] = &[".md", ".mdx", ".txt", ".rst"];

/// New content must shrink below this fraction of the old before the
/// substitution counts as a replacement.
const SHRINK_RATIO: f64 = 0.7;

pub struct CheckCommentReplacement;

#[async_trait]
impl Hook for CheckCommentReplacement {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        if let Some(path) = ctx.payload.file_path()
            && has_extension(path, DOC_EXTENSIONS)
        {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        let ops = ctx.payload.edit_operations();
        if ops.is_empty() {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }

        let flagged: Vec<&EditOperation> =
            ops.iter().filter(|op| is_comment_replacement(op)).collect();
        if flagged.is_empty() {
            return Ok(Outcome::Allow);
        }

        let mut reason = String::from(
            "An edit replaces working code with comments instead of removing or fixing it:\n",
        );
        for op in &flagged {
            let preview: String = op.old_string.lines().take(3).collect::<Vec<_>>().join("\n");
            reason.push_str(&format!("\n  replaced region starts:\n{preview}\n"));
        }
        reason.push_str(
            "\nIf the code should go away, delete it outright; if it must stay, keep it working. \
             Commenting out the implementation hides the regression.",
        );
        Ok(Outcome::block(reason))
    }
}

/// Whether a line is commentary (not counting markdown-style headings).
fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("##") {
        // `## Heading` in a hash-comment language is usually markdown
        // embedded in a docstring or script header, not commentary
        let after = trimmed.trim_start_matches('#');
        if after.starts_with(' ') {
            return false;
        }
    }
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with('#')
        || trimmed.starts_with("<!--")
}

fn functional_lines(text: &str) -> usize {
    text.lines()
        .filter(|l| !l.trim().is_empty() && !is_comment_line(l))
        .count()
}

fn comment_lines(text: &str) -> usize {
    text.lines().filter(|l| is_comment_line(l)).count()
}

/// Detect "functional region becomes commentary" for one edit.
pub fn is_comment_replacement(op: &EditOperation) -> bool {
    let old_functional = functional_lines(&op.old_string);
    if old_functional == 0 {
        return false; // nothing functional was lost
    }
    let new_trimmed = op.new_string.trim();
    if new_trimmed.is_empty() {
        return false; // plain deletion is legal
    }
    let new_functional = functional_lines(&op.new_string);
    let new_comments = comment_lines(&op.new_string);
    if new_comments == 0 || new_functional > new_comments {
        return false; // still mostly code
    }
    if new_functional >= old_functional {
        return false;
    }
    // Meaningful shrink of the region overall
    (op.new_string.len() as f64) < (op.old_string.len() as f64) * SHRINK_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(old: &str, new: &str) -> EditOperation {
        EditOperation {
            old_string: old.into(),
            new_string: new.into(),
            file_path: None,
        }
    }

    #[test]
    fn test_code_to_comment_flagged() {
        let edit = op(
            "function total(xs) {\n  return xs.reduce((a, b) => a + b, 0);\n}\n",
            "// total() removed\n",
        );
        assert!(is_comment_replacement(&edit));
    }

    #[test]
    fn test_plain_deletion_is_legal() {
        let edit = op("function dead() {\n  return 1;\n}\n", "");
        assert!(!is_comment_replacement(&edit));
        let edit = op("const x = 1;\n", "   \n");
        assert!(!is_comment_replacement(&edit));
    }

    #[test]
    fn test_code_to_code_is_legal() {
        let edit = op(
            "return xs.reduce((a, b) => a + b, 0);",
            "return sum(xs);",
        );
        assert!(!is_comment_replacement(&edit));
    }

    #[test]
    fn test_adding_comment_above_code_is_legal() {
        let edit = op(
            "return sum(xs);",
            "// overflow-safe summation\nreturn checkedSum(xs);",
        );
        assert!(!is_comment_replacement(&edit));
    }

    #[test]
    fn test_comment_only_edit_is_legal() {
        let edit = op("// old wording", "// new wording");
        assert!(!is_comment_replacement(&edit));
    }

    #[test]
    fn test_markdown_heading_not_commentary() {
        // A python docstring heading should not classify as a comment line
        assert!(!is_comment_line("## Usage"));
        assert!(!is_comment_line("### Details"));
        assert!(is_comment_line("# plain comment"));
        assert!(is_comment_line("##no-space-pragma"));
    }

    #[test]
    fn test_hash_comment_replacement_flagged() {
        let edit = op(
            "def load():\n    return read_config()\n",
            "# load disabled\n",
        );
        assert!(is_comment_replacement(&edit));
    }
}
