//! Hook registry: metadata and factories for every registered hook
//!
//! The definitions table is the single place a hook id exists. The
//! dispatcher, `list`, `status`, and host-settings generation all read it;
//! adding a hook means adding one entry here plus its implementation.

pub mod any_types;
pub mod checkpoint;
pub mod codebase_map;
pub mod comment_replacement;
pub mod exec;
pub mod file_guard;
pub mod lint;
pub mod matcher;
pub mod project;
pub mod runtime;
pub mod self_review;
pub mod test_runner;
pub mod thinking_level;
pub mod todos;
pub mod typecheck;
pub mod unused_params;

use dashmap::DashMap;

use claudekit_core::HookEvent;

use runtime::Hook;

/// Static metadata for one hook.
#[derive(Debug)]
pub struct HookDefinition {
    /// Kebab-case id used on the command line and in config
    pub id: &'static str,
    /// Events this hook registers for
    pub events: &'static [HookEvent],
    /// Tool-name matcher (see [`matcher::matches_tool`])
    pub matcher: &'static str,
    /// One-line human description for `list`
    pub description: &'static str,
    /// Tooling class this hook depends on, when detection-based
    pub dependency: Option<&'static str>,
    /// Skip this hook when the event originates from a subagent
    pub disabled_in_subagent: bool,
}

use HookEvent::*;

/// Every registered hook. Order is the `list` display order.
pub static DEFINITIONS: &[HookDefinition] = &[
    HookDefinition {
        id: "typecheck-changed",
        events: &[PostToolUse],
        matcher: "Write|Edit|MultiEdit",
        description: "Type-check the project when a TypeScript file changes",
        dependency: Some("typescript"),
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "typecheck-project",
        events: &[Stop],
        matcher: "*",
        description: "Type-check the whole project before stopping",
        dependency: Some("typescript"),
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "lint-changed",
        events: &[PostToolUse],
        matcher: "Write|Edit|MultiEdit",
        description: "Lint the project when a source file changes",
        dependency: Some("linter"),
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "lint-project",
        events: &[Stop],
        matcher: "*",
        description: "Lint the whole project before stopping",
        dependency: Some("linter"),
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "test-changed",
        events: &[PostToolUse],
        matcher: "Write|Edit|MultiEdit",
        description: "Run tests when a source file changes",
        dependency: Some("test-runner"),
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "test-project",
        events: &[Stop],
        matcher: "*",
        description: "Run the full test suite before stopping",
        dependency: Some("test-runner"),
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "check-any-changed",
        events: &[PostToolUse],
        matcher: "Write|Edit|MultiEdit",
        description: "Forbid `any` types in edited TypeScript files",
        dependency: None,
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "check-comment-replacement",
        events: &[PostToolUse],
        matcher: "Edit|MultiEdit",
        description: "Flag code replaced by comments instead of being removed",
        dependency: None,
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "check-unused-parameters",
        events: &[PostToolUse],
        matcher: "Edit|MultiEdit",
        description: "Flag parameters renamed to _-prefixed instead of removed",
        dependency: None,
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "check-todos",
        events: &[Stop, SubagentStop],
        matcher: "*",
        description: "Block stopping while todo items remain open",
        dependency: None,
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "create-checkpoint",
        events: &[Stop, SubagentStop],
        matcher: "*",
        description: "Stash a checkpoint of uncommitted work on stop",
        dependency: None,
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "self-review",
        events: &[Stop],
        matcher: "*",
        description: "Prompt a structured self-review after code changes",
        dependency: None,
        disabled_in_subagent: true,
    },
    HookDefinition {
        id: "thinking-level",
        events: &[UserPromptSubmit],
        matcher: "*",
        description: "Inject the configured thinking keyword into each prompt",
        dependency: None,
        disabled_in_subagent: false,
    },
    HookDefinition {
        id: "codebase-map",
        events: &[SessionStart, UserPromptSubmit],
        matcher: "*",
        description: "Inject a project map once per session",
        dependency: Some("codebase-map"),
        disabled_in_subagent: true,
    },
    HookDefinition {
        id: "codebase-map-update",
        events: &[PostToolUse],
        matcher: "Write|Edit|MultiEdit",
        description: "Incrementally update the project map on file changes",
        dependency: Some("codebase-map"),
        disabled_in_subagent: true,
    },
    HookDefinition {
        id: "file-guard",
        events: &[PreToolUse],
        matcher: "Read|Edit|MultiEdit|Write|Bash",
        description: "Deny access to sensitive files (env, keys, credentials)",
        dependency: None,
        disabled_in_subagent: false,
    },
];

/// Look up a definition by id.
pub fn definition(id: &str) -> Option<&'static HookDefinition> {
    DEFINITIONS.iter().find(|d| d.id == id)
}

/// Instantiate the implementation for a definition.
fn build_hook(id: &str) -> Option<Box<dyn Hook>> {
    let hook: Box<dyn Hook> = match id {
        "typecheck-changed" => Box::new(typecheck::TypecheckChanged),
        "typecheck-project" => Box::new(typecheck::TypecheckProject),
        "lint-changed" => Box::new(lint::LintChanged),
        "lint-project" => Box::new(lint::LintProject),
        "test-changed" => Box::new(test_runner::TestChanged),
        "test-project" => Box::new(test_runner::TestProject),
        "check-any-changed" => Box::new(any_types::CheckAnyChanged),
        "check-comment-replacement" => Box::new(comment_replacement::CheckCommentReplacement),
        "check-unused-parameters" => Box::new(unused_params::CheckUnusedParameters),
        "check-todos" => Box::new(todos::CheckTodos),
        "create-checkpoint" => Box::new(checkpoint::CreateCheckpoint),
        "self-review" => Box::new(self_review::SelfReview),
        "thinking-level" => Box::new(thinking_level::ThinkingLevel),
        "codebase-map" => Box::new(codebase_map::CodebaseMap),
        "codebase-map-update" => Box::new(codebase_map::CodebaseMapUpdate),
        "file-guard" => Box::new(file_guard::FileGuard),
        _ => return None,
    };
    Some(hook)
}

/// Thread-safe registry mapping hook ids to live implementations.
pub struct HookRegistry {
    hooks: DashMap<&'static str, Box<dyn Hook>>,
}

impl HookRegistry {
    /// Build the registry from the definitions table.
    pub fn build() -> Self {
        let hooks = DashMap::new();
        for def in DEFINITIONS {
            if let Some(hook) = build_hook(def.id) {
                hooks.insert(def.id, hook);
            }
        }
        Self { hooks }
    }

    /// Get the implementation for a hook id.
    pub fn get(
        &self,
        id: &str,
    ) -> Option<dashmap::mapref::one::Ref<'_, &'static str, Box<dyn Hook>>> {
        self.hooks.get(id)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
pub mod testing {
    //! Context builders shared by hook unit tests.

    use claudekit_core::SessionTracker;
    use claudekit_core::config::Config;
    use claudekit_core::constants::UNKNOWN_SESSION_ID;

    use super::definition;
    use crate::hooks::runtime::HookContext;
    use crate::io::HookPayload;

    /// Build a context for `hook_id` with its cwd pinned to a fresh temp
    /// directory (no project evidence, ephemeral session).
    pub fn context_for(hook_id: &str, payload_json: serde_json::Value) -> HookContext {
        let dir = std::env::temp_dir().join(format!("ck-hooktest-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create test dir");
        let mut payload: HookPayload =
            serde_json::from_value(payload_json).expect("valid payload json");
        payload.cwd = Some(dir);
        HookContext::new(
            definition(hook_id).expect("known hook id"),
            payload,
            Config::default(),
            SessionTracker::open(UNKNOWN_SESSION_ID),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_definition_has_an_implementation() {
        for def in DEFINITIONS {
            assert!(
                build_hook(def.id).is_some(),
                "{} has no implementation",
                def.id
            );
        }
    }

    #[test]
    fn test_registry_builds_all_hooks() {
        let registry = HookRegistry::build();
        assert_eq!(registry.len(), DEFINITIONS.len());
        assert!(registry.get("file-guard").is_some());
        assert!(registry.get("no-such-hook").is_none());
    }

    #[test]
    fn test_ids_are_unique_and_kebab_case() {
        let mut seen = std::collections::HashSet::new();
        for def in DEFINITIONS {
            assert!(seen.insert(def.id), "duplicate id {}", def.id);
            assert!(
                def.id
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{} is not kebab-case",
                def.id
            );
        }
    }

    #[test]
    fn test_tool_scoped_hooks_have_tool_matchers() {
        for def in DEFINITIONS {
            let tool_scoped = def.events.iter().any(|e| e.is_tool_event());
            if !tool_scoped {
                assert_eq!(def.matcher, "*", "{} should be universal", def.id);
            }
        }
    }

    #[test]
    fn test_pre_tool_use_hooks_exist() {
        let guard = definition("file-guard").unwrap();
        assert_eq!(guard.events.len(), 1);
        assert_eq!(guard.events[0], HookEvent::PreToolUse);
        assert!(guard.matcher.contains("Bash"));
    }
}
