//! Read-only subcommands: list, stats, recent, status, settings,
//! plus the per-session disable/enable toggles.

use serde::Serialize;

use claudekit_core::config::Config;
use claudekit_core::session::{SessionTracker, most_recent_session};
use claudekit_core::{ExecutionLog, HookError, HookEvent};

use crate::hooks::{DEFINITIONS, HookDefinition, definition};

/// `hooks list`
pub fn render_list() -> String {
    let mut out = String::new();
    for def in DEFINITIONS {
        let events = def
            .events
            .iter()
            .map(HookEvent::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{:<26} {:<34} matcher: {}\n    {}\n",
            def.id, events, def.matcher, def.description
        ));
    }
    out
}

/// `hooks stats [--hook <id>]`
pub fn render_stats(log: &ExecutionLog, hook: Option<&str>) -> Result<String, HookError> {
    let ids: Vec<String> = match hook {
        Some(id) => {
            validate_hook_id(id)?;
            vec![id.to_string()]
        }
        None => log.logged_hooks(),
    };
    if ids.is_empty() {
        return Ok("no executions logged yet\n".to_string());
    }
    let mut out = String::new();
    for id in ids {
        let Some(stats) = log.stats(&id) else {
            out.push_str(&format!("{id}: no executions logged\n"));
            continue;
        };
        out.push_str(&format!(
            "{id}: {} runs, p50 {}ms, p90 {}ms, p99 {}ms, max {}ms\n",
            stats.invocations, stats.p50_ms, stats.p90_ms, stats.p99_ms, stats.max_ms
        ));
        for (outcome, count) in &stats.outcomes {
            out.push_str(&format!("    {outcome:<24} {count}\n"));
        }
    }
    Ok(out)
}

/// `hooks recent [--hook <id>] [--count N]`
pub fn render_recent(
    log: &ExecutionLog,
    hook: Option<&str>,
    count: usize,
) -> Result<String, HookError> {
    let ids: Vec<String> = match hook {
        Some(id) => {
            validate_hook_id(id)?;
            vec![id.to_string()]
        }
        None => log.logged_hooks(),
    };
    let mut out = String::new();
    for id in ids {
        for entry in log.recent(&id, count) {
            out.push_str(&format!(
                "{} {:<26} {:<20} exit {} {}ms session {}\n",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                id,
                entry.outcome,
                entry.exit_code,
                entry.duration_ms,
                entry.session_id
            ));
        }
    }
    if out.is_empty() {
        out.push_str("no executions logged yet\n");
    }
    Ok(out)
}

/// `hooks status [<hook-id>]`
pub fn render_status(hook: Option<&str>) -> Result<String, HookError> {
    let defs: Vec<&HookDefinition> = match hook {
        Some(id) => vec![validate_hook_id(id)?],
        None => DEFINITIONS.iter().collect(),
    };
    let session_id = most_recent_session();
    let session = session_id.as_deref().map(SessionTracker::open);
    let config = Config::load(&std::env::current_dir().unwrap_or_default());

    let mut out = String::new();
    match &session_id {
        Some(id) => out.push_str(&format!("session: {id}\n")),
        None => out.push_str("session: none recorded\n"),
    }
    if let Some(root) = config.project_root() {
        out.push_str(&format!("project: {}\n", root.display()));
    }
    out.push('\n');
    for def in defs {
        let disabled = session
            .as_ref()
            .map(|s| s.is_disabled(def.id))
            .unwrap_or(false);
        let state = if disabled { "disabled" } else { "enabled" };
        out.push_str(&format!("{:<26} {state}\n", def.id));
        out.push_str(&format!(
            "    events: {}\n    matcher: {}\n",
            def.events
                .iter()
                .map(HookEvent::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            def.matcher
        ));
        if let Some(dep) = def.dependency {
            out.push_str(&format!("    depends on: {dep}\n"));
        }
        if def.disabled_in_subagent {
            out.push_str("    skipped in subagents\n");
        }
    }
    Ok(out)
}

/// `hooks disable <id>` / `hooks enable <id>`
pub fn toggle_hook(hook_id: &str, session: Option<&str>, enable: bool) -> Result<String, HookError> {
    validate_hook_id(hook_id)?;
    let session_id = match session {
        Some(id) => id.to_string(),
        None => most_recent_session().ok_or_else(|| HookError::InvalidInput {
            message: "no sessions recorded; pass --session <id>".to_string(),
        })?,
    };
    let tracker = SessionTracker::open(session_id.clone());
    if enable {
        tracker.enable(hook_id);
        Ok(format!("enabled {hook_id} for session {session_id}\n"))
    } else {
        tracker.disable(hook_id);
        Ok(format!("disabled {hook_id} for session {session_id}\n"))
    }
}

fn validate_hook_id(id: &str) -> Result<&'static HookDefinition, HookError> {
    definition(id).ok_or_else(|| HookError::InvalidInput {
        message: format!("unknown hook id '{id}' (see `hooks list`)"),
    })
}

// ===== Host settings generation =====

#[derive(Serialize)]
struct SettingsCommand {
    #[serde(rename = "type")]
    kind: &'static str,
    command: String,
}

#[derive(Serialize)]
struct SettingsEntry {
    matcher: String,
    hooks: Vec<SettingsCommand>,
}

/// Generate the `.claude/settings.json` `hooks` object from the registry.
/// The installer merges this; the engine itself never reads it back.
pub fn generate_settings() -> serde_json::Value {
    let mut hooks = serde_json::Map::new();
    for event in HookEvent::all() {
        let entries: Vec<SettingsEntry> = DEFINITIONS
            .iter()
            .filter(|def| def.events.contains(event))
            .map(|def| SettingsEntry {
                matcher: def.matcher.to_string(),
                hooks: vec![SettingsCommand {
                    kind: "command",
                    command: format!("hooks-cli run {}", def.id),
                }],
            })
            .collect();
        if !entries.is_empty() {
            hooks.insert(
                event.as_str().to_string(),
                serde_json::to_value(entries).expect("serializable entries"),
            );
        }
    }
    serde_json::json!({ "hooks": hooks })
}

/// `hooks settings`
pub fn render_settings() -> String {
    serde_json::to_string_pretty(&generate_settings()).unwrap_or_else(|_| "{}".to_string())
}
