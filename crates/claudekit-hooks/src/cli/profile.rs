//! Benchmarking driver for `hooks profile`
//!
//! Runs hooks against synthetic payloads under the `"unknown"` session, so
//! measurements never touch real session flags or the execution log. Warns
//! when a hook is slow (5 s) or its injected context brushes the 9 000-char
//! cap.

use serde_json::json;

use claudekit_core::HookError;
use claudekit_core::constants::{MAX_INJECTION_CHARS, PROFILE_SLOW_THRESHOLD};
use claudekit_core::events::HookEvent;

use crate::cli::dispatcher::HookDispatcher;
use crate::hooks::{DEFINITIONS, HookDefinition, definition};
use crate::io::HookPayload;

/// Synthetic payload for one definition's primary event.
pub fn synthetic_payload(def: &HookDefinition) -> HookPayload {
    let event = def.events[0];
    let tool = sample_tool(def.matcher);
    let mut payload = json!({
        "hook_event_name": event.as_str(),
    });
    if event.is_tool_event() {
        payload["tool_name"] = json!(tool);
        payload["tool_input"] = match tool {
            "Bash" => json!({"command": "echo profile"}),
            _ => json!({
                "file_path": "src/profile_sample.ts",
                "old_string": "",
                "new_string": "export const sample = 1;\n"
            }),
        };
    }
    if event == HookEvent::UserPromptSubmit {
        payload["prompt"] = json!("profile run");
    }
    serde_json::from_value(payload).expect("synthetic payload is valid")
}

/// First concrete alternative of a matcher, for the synthetic tool name.
fn sample_tool(matcher: &str) -> &'static str {
    let first = matcher.split(['|', ',']).next().unwrap_or("*").trim();
    match first {
        "Read" => "Read",
        "Bash" => "Bash",
        "Edit" => "Edit",
        "MultiEdit" => "MultiEdit",
        _ => "Write",
    }
}

/// Run the profile and render its report.
pub async fn run_profile(
    dispatcher: &HookDispatcher,
    hook_id: Option<&str>,
    iterations: usize,
) -> Result<String, HookError> {
    let defs: Vec<&'static HookDefinition> = match hook_id {
        Some(id) => vec![definition(id).ok_or_else(|| HookError::InvalidInput {
            message: format!("unknown hook id '{id}' (see `hooks list`)"),
        })?],
        None => DEFINITIONS.iter().collect(),
    };
    let iterations = iterations.max(1);

    // A run id keeps interleaved profile outputs distinguishable in CI logs
    let mut report = format!(
        "profile run {} — {} iteration(s) per hook\n\n",
        uuid::Uuid::new_v4(),
        iterations
    );
    for def in defs {
        let mut durations = Vec::with_capacity(iterations);
        let mut max_out = 0u64;
        for _ in 0..iterations {
            let payload = synthetic_payload(def);
            let run = dispatcher.run_with_payload(def, payload, false).await;
            durations.push(run.duration);
            let out_len = run.rendered.stdout.as_ref().map_or(0, |s| s.len() as u64);
            max_out = max_out.max(out_len);
        }
        let total: std::time::Duration = durations.iter().sum();
        let mean = total / durations.len() as u32;
        let min = durations.iter().min().copied().unwrap_or_default();
        let max = durations.iter().max().copied().unwrap_or_default();
        report.push_str(&format!(
            "{:<26} mean {:>7.1?}  min {:>7.1?}  max {:>7.1?}  out {:>6}B\n",
            def.id, mean, min, max, max_out
        ));
        if mean >= PROFILE_SLOW_THRESHOLD {
            report.push_str(&format!(
                "    warning: mean above {}s slow threshold\n",
                PROFILE_SLOW_THRESHOLD.as_secs()
            ));
        }
        if max_out as usize >= MAX_INJECTION_CHARS {
            report.push_str(&format!(
                "    warning: output at the {MAX_INJECTION_CHARS}-char injection cap\n"
            ));
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_payload_matches_matcher() {
        for def in DEFINITIONS {
            let payload = synthetic_payload(def);
            let event = payload.event().expect("synthetic event is known");
            assert!(def.events.contains(&event), "{} event mismatch", def.id);
            if event.is_tool_event() {
                assert!(
                    crate::hooks::matcher::matches_tool(def.matcher, payload.tool()),
                    "{}: synthetic tool '{}' misses matcher '{}'",
                    def.id,
                    payload.tool(),
                    def.matcher
                );
            }
        }
    }

    #[test]
    fn test_synthetic_payload_is_session_less() {
        for def in DEFINITIONS {
            let payload = synthetic_payload(def);
            assert!(payload.session_id.is_none());
            assert!(payload.transcript_path.is_none());
        }
    }
}
