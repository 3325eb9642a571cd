//! thinking-level: inject the configured thinking keyword per prompt

use async_trait::async_trait;
use serde::Deserialize;

use claudekit_core::Result;

use crate::hooks::runtime::{Hook, HookContext, Outcome, SkipReason};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThinkingLevelConfig {
    pub level: u8,
}

impl Default for ThinkingLevelConfig {
    fn default() -> Self {
        Self { level: 2 }
    }
}

/// Keyword for a level; levels above 3 saturate.
pub fn keyword_for_level(level: u8) -> &'static str {
    match level {
        0 => "",
        1 => "think",
        2 => "megathink",
        _ => "ultrathink",
    }
}

pub struct ThinkingLevel;

#[async_trait]
impl Hook for ThinkingLevel {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let cfg: ThinkingLevelConfig = ctx.hook_config();
        let keyword = keyword_for_level(cfg.level);
        if keyword.is_empty() {
            return Ok(Outcome::Skip(SkipReason::NotApplicable));
        }
        Ok(Outcome::InjectContext {
            text: keyword.to_string(),
        })
    }
}
