//! Property-based tests for the pure cores: transcript grouping, ignore-rule
//! ordering, and the bash tokenizer's totality.

use proptest::prelude::*;

use claudekit_core::guard::rules::GuardRules;
use claudekit_core::guard::{extract_path_candidates, flag_sensitive_exfiltration};
use claudekit_core::transcript::Transcript;

fn text_record(role: &str, text: &str) -> String {
    serde_json::json!({
        "type": role,
        "message": {"role": role, "content": [{"type": "text", "text": text}]}
    })
    .to_string()
}

fn tool_record(path: &str) -> String {
    serde_json::json!({
        "type": "assistant",
        "message": {"role": "assistant", "content": [
            {"type": "tool_use", "name": "Edit", "input": {"file_path": path}}
        ]}
    })
    .to_string()
}

fn transcript_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            ("[a-z]{1,12}").prop_map(|t| text_record("user", &t)),
            ("[a-z]{1,12}").prop_map(|t| text_record("assistant", &t)),
            ("[a-z]{1,8}\\.ts").prop_map(|p| tool_record(&p)),
        ],
        0..20,
    )
    .prop_map(|lines| lines.join("\n"))
}

proptest! {
    /// Grouping must not change when the host appends a newline or a
    /// truncated (malformed) trailing line.
    #[test]
    fn grouping_stable_under_trailing_perturbations(raw in transcript_strategy()) {
        let baseline = Transcript::parse(&raw).group_ui_messages().len();

        let with_newline = format!("{raw}\n");
        prop_assert_eq!(
            Transcript::parse(&with_newline).group_ui_messages().len(),
            baseline
        );

        let with_garbage = format!("{raw}\n{{\"type\":\"assistant\",\"mess");
        prop_assert_eq!(
            Transcript::parse(&with_garbage).group_ui_messages().len(),
            baseline
        );
    }

    /// Groups partition the displayable records: every record index appears
    /// in exactly one group, in order.
    #[test]
    fn grouping_partitions_records(raw in transcript_strategy()) {
        let transcript = Transcript::parse(&raw);
        let groups = transcript.group_ui_messages();
        let mut seen: Vec<usize> = Vec::new();
        for group in &groups {
            prop_assert!(!group.records.is_empty());
            seen.extend(&group.records);
        }
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(&sorted, &seen, "indices must be strictly increasing");
    }

    /// A trailing negation always wins over any earlier protection of the
    /// same literal path.
    #[test]
    fn trailing_negation_reintroduces(path in "[a-z]{1,10}\\.[a-z]{1,4}") {
        let mut rules = GuardRules::defaults();
        rules.push_pattern(&path);
        prop_assert!(rules.is_protected(&path));
        rules.push_pattern(&format!("!{path}"));
        prop_assert!(!rules.is_protected(&path));
    }

    /// The bash parser is total: arbitrary input never panics and never
    /// produces empty candidate paths.
    #[test]
    fn bash_parser_is_total(command in "\\PC{0,120}") {
        let candidates = extract_path_candidates(&command);
        for candidate in candidates {
            prop_assert!(!candidate.path.is_empty());
        }
        let _ = flag_sensitive_exfiltration(&command);
    }
}
