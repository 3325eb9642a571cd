//! Append-only execution log
//!
//! Every hook invocation appends exactly one JSON line to
//! `~/.claudekit/logs/<hook-id>.log`. Writes use `O_APPEND` with a single
//! `write_all`, which is atomic for lines this small, so concurrent hooks
//! interleave but never tear. The log is never mutated; rotation is a caller
//! concern.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::path::logs_dir;

/// One log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub exit_code: i32,
    pub bytes_out: u64,
    pub bytes_err: u64,
    pub session_id: String,
    /// Outcome tag: `allow`, `block`, `inject`, `permission:<decision>`,
    /// `skipped:<reason>`, `error`, `timeout`
    pub outcome: String,
}

/// Aggregated view of one hook's log, for `stats`.
#[derive(Debug, Default)]
pub struct HookStats {
    pub invocations: u64,
    pub outcomes: BTreeMap<String, u64>,
    pub p50_ms: u64,
    pub p90_ms: u64,
    pub p99_ms: u64,
    pub max_ms: u64,
}

/// Writer with a cached append handle per hook (profile appends in a loop).
pub struct ExecutionLog {
    dir: PathBuf,
    handles: Mutex<BTreeMap<String, File>>,
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self {
            dir: logs_dir(),
            handles: Mutex::new(BTreeMap::new()),
        }
    }

    fn log_path(&self, hook_id: &str) -> PathBuf {
        self.dir.join(format!("{hook_id}.log"))
    }

    /// Append one entry. Failures are logged and swallowed: a missing log
    /// line must never turn into a host-visible error.
    pub fn append(&self, hook_id: &str, entry: &ExecutionLogEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("unserializable log entry for {hook_id}: {e}");
                return;
            }
        };
        let mut handles = self.handles.lock();
        if !handles.contains_key(hook_id) {
            if let Err(e) = std::fs::create_dir_all(&self.dir) {
                tracing::warn!("cannot create log dir {}: {e}", self.dir.display());
                return;
            }
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.log_path(hook_id))
            {
                Ok(file) => {
                    handles.insert(hook_id.to_string(), file);
                }
                Err(e) => {
                    tracing::warn!("cannot open log for {hook_id}: {e}");
                    return;
                }
            }
        }
        if let Some(file) = handles.get_mut(hook_id)
            && let Err(e) = file.write_all(format!("{line}\n").as_bytes())
        {
            tracing::warn!("log append failed for {hook_id}: {e}");
        }
    }

    /// Last `count` entries for a hook, oldest first. Malformed lines are
    /// skipped, mirroring the transcript parser's tolerance.
    pub fn recent(&self, hook_id: &str, count: usize) -> Vec<ExecutionLogEntry> {
        let Ok(raw) = std::fs::read_to_string(self.log_path(hook_id)) else {
            return Vec::new();
        };
        let entries: Vec<ExecutionLogEntry> = raw
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        let start = entries.len().saturating_sub(count);
        entries[start..].to_vec()
    }

    /// Aggregate one hook's entire log.
    pub fn stats(&self, hook_id: &str) -> Option<HookStats> {
        let entries = self.recent(hook_id, usize::MAX);
        if entries.is_empty() {
            return None;
        }
        let mut stats = HookStats {
            invocations: entries.len() as u64,
            ..Default::default()
        };
        let mut durations: Vec<u64> = Vec::with_capacity(entries.len());
        for entry in &entries {
            *stats.outcomes.entry(entry.outcome.clone()).or_insert(0) += 1;
            durations.push(entry.duration_ms);
        }
        durations.sort_unstable();
        stats.p50_ms = percentile(&durations, 50);
        stats.p90_ms = percentile(&durations, 90);
        stats.p99_ms = percentile(&durations, 99);
        stats.max_ms = *durations.last().unwrap_or(&0);
        Some(stats)
    }

    /// Hook ids that have a log file.
    pub fn logged_hooks(&self) -> Vec<String> {
        let mut ids: Vec<String> = std::fs::read_dir(&self.dir)
            .map(|rd| {
                rd.flatten()
                    .filter_map(|e| {
                        let name = e.file_name().to_string_lossy().into_owned();
                        name.strip_suffix(".log").map(String::from)
                    })
                    .collect()
            })
            .unwrap_or_default();
        ids.sort();
        ids
    }
}

/// Nearest-rank percentile over sorted data.
fn percentile(sorted: &[u64], pct: u64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (pct as f64 / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_nearest_rank() {
        let data: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&data, 50), 50);
        assert_eq!(percentile(&data, 99), 99);
        assert_eq!(percentile(&data, 100), 100);
        assert_eq!(percentile(&[42], 90), 42);
        assert_eq!(percentile(&[], 50), 0);
    }

    #[test]
    fn test_entry_roundtrip() {
        let entry = ExecutionLogEntry {
            timestamp: Utc::now(),
            duration_ms: 12,
            exit_code: 2,
            bytes_out: 0,
            bytes_err: 230,
            session_id: "abc".into(),
            outcome: "block".into(),
        };
        let line = serde_json::to_string(&entry).unwrap();
        let back: ExecutionLogEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back.outcome, "block");
        assert_eq!(back.exit_code, 2);
    }
}
