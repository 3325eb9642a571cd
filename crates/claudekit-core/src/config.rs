//! Project configuration resolution
//!
//! Locates the nearest `.claudekit/config.json` by walking up from the
//! working directory, validates the raw document against a generated JSON
//! Schema, and hands hooks a merged view of `hooks.global` and `hooks.<id>`.
//!
//! A user-owned config file is never allowed to break the host: any failure
//! (missing file, invalid JSON, schema mismatch) degrades to defaults with a
//! single warning on stderr.
//!
//! # Example
//! ```
//! use claudekit_core::config::Config;
//!
//! let cfg = Config::default();
//! assert!(cfg.hook_enabled("check-any-changed"));
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    CONFIG_FILE_NAME, DEBUG_ENV_VAR, DEFAULT_HOOK_TIMEOUT, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
    PROJECT_CONFIG_DIR,
};
use crate::path::find_project_root;

/// Raw shape of `.claudekit/config.json`.
///
/// Per-hook values stay as `serde_json::Value` here: unknown hooks and
/// unknown keys are preserved but ignored, and each hook deserializes its own
/// typed view via [`Config::hook_config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ConfigFile {
    /// Map of hook id (plus the reserved `global` entry) to per-hook config
    pub hooks: HashMap<String, Value>,

    /// Extra environment variables exported to hook subprocesses
    pub environment: HashMap<String, String>,
}

/// Defaults shared by every hook, from `hooks.global`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct GlobalHookConfig {
    /// Default subprocess timeout in seconds (clamped to 1..300)
    pub timeout: Option<u64>,

    /// Master switch; `false` disables every hook
    pub enabled: Option<bool>,
}

static CONFIG_SCHEMA: Lazy<Option<jsonschema::Validator>> = Lazy::new(|| {
    let schema = schemars::schema_for!(ConfigFile);
    let schema_json = serde_json::to_value(schema).ok()?;
    jsonschema::validator_for(&schema_json).ok()
});

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Directory containing `.claudekit/`, when a project was found
    project_root: Option<PathBuf>,
    file: ConfigFile,
    global: GlobalHookConfig,
}

impl Config {
    /// Locate and load the nearest project configuration above `cwd`.
    ///
    /// Never fails: schema or parse problems fall back to defaults and leave
    /// one warning on stderr.
    pub fn load(cwd: &Path) -> Self {
        let Some(root) = find_project_root(cwd) else {
            tracing::debug!("no .claudekit/config.json above {}", cwd.display());
            return Self::default();
        };
        let path = root.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE_NAME);
        let file = Self::parse_file(&path).unwrap_or_default();
        let global = file
            .hooks
            .get("global")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Self {
            project_root: Some(root),
            file,
            global,
        }
    }

    fn parse_file(path: &Path) -> Option<ConfigFile> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("failed to read {}: {e}; using defaults", path.display());
                return None;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("invalid JSON in {}: {e}; using defaults", path.display());
                return None;
            }
        };
        if let Some(validator) = CONFIG_SCHEMA.as_ref()
            && let Err(err) = validator.validate(&value)
        {
            tracing::warn!(
                "{} does not match the config schema: {err}; using defaults",
                path.display()
            );
            return None;
        }
        match serde_json::from_value(value) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("failed to decode {}: {e}; using defaults", path.display());
                None
            }
        }
    }

    /// Build a config directly from a parsed file (tests, profile driver).
    pub fn from_file(project_root: Option<PathBuf>, file: ConfigFile) -> Self {
        let global = file
            .hooks
            .get("global")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Self {
            project_root,
            file,
            global,
        }
    }

    /// Directory containing `.claudekit/`, when a project was found.
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Typed per-hook configuration: `hooks.global` merged under `hooks.<id>`.
    ///
    /// Keys present in both take the per-hook value. A malformed per-hook
    /// entry degrades to `T::default()` with a warning.
    pub fn hook_config<T>(&self, hook_id: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let mut merged = match self.file.hooks.get("global") {
            Some(Value::Object(global)) => global.clone(),
            _ => serde_json::Map::new(),
        };
        if let Some(Value::Object(specific)) = self.file.hooks.get(hook_id) {
            for (k, v) in specific {
                merged.insert(k.clone(), v.clone());
            }
        }
        match serde_json::from_value(Value::Object(merged)) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("invalid hooks.{hook_id} config: {e}; using defaults");
                T::default()
            }
        }
    }

    /// Whether hooks are enabled at all (`hooks.global.enabled`, default true).
    pub fn hook_enabled(&self, _hook_id: &str) -> bool {
        self.global.enabled.unwrap_or(true)
    }

    /// Effective timeout for a hook: its own `timeout`, else the global one,
    /// else `fallback`; always clamped to 1..300 s.
    pub fn effective_timeout(&self, hook_timeout: Option<u64>, fallback: Duration) -> Duration {
        let secs = hook_timeout
            .or(self.global.timeout)
            .unwrap_or(fallback.as_secs());
        Duration::from_secs(secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }

    /// Default timeout when neither hook nor global configure one.
    pub fn default_timeout(&self) -> Duration {
        self.effective_timeout(None, DEFAULT_HOOK_TIMEOUT)
    }

    /// Extra environment variables for hook subprocesses.
    pub fn environment(&self) -> &HashMap<String, String> {
        &self.file.environment
    }
}

/// Whether verbose stderr diagnostics are requested (`DEBUG=true`).
pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV_VAR)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}
