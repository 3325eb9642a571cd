//! Hook dispatcher: payload intake → lifecycle → response → log
//!
//! Every `run` invocation yields exactly one rendered response and one
//! execution-log line, whatever happens inside the hook. Internal failures
//! exit 1 with a single-line reason on stderr; they are never rendered as
//! blocking decisions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use claudekit_core::config::Config;
use claudekit_core::transcript::Transcript;
use claudekit_core::{ExecutionLog, ExecutionLogEntry, ExitCode, HookError, SessionTracker};

use crate::hooks::runtime::{HookContext, Outcome, pre_execution_skip};
use crate::hooks::{HookDefinition, HookRegistry, definition};
use crate::io::{HookPayload, RenderedResponse, StdinProcessor, render};

/// Extra headroom above the hook's own subprocess timeout before the
/// dispatcher gives up on the whole execution.
const DISPATCH_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Abstracts payload intake so tests and `profile` can inject payloads.
#[async_trait]
pub trait InputProvider: Send + Sync {
    async fn read_payload(&mut self) -> HookPayload;
}

#[async_trait]
impl InputProvider for StdinProcessor {
    async fn read_payload(&mut self) -> HookPayload {
        StdinProcessor::read_payload(self).await
    }
}

/// Everything one invocation produced.
#[derive(Debug)]
pub struct RunReport {
    pub rendered: RenderedResponse,
    pub outcome_tag: String,
    pub session_id: String,
    pub duration: Duration,
}

type ThreadSafeInputProvider = Arc<Mutex<Box<dyn InputProvider>>>;

/// Routes `run <hook-id>` through the base lifecycle.
pub struct HookDispatcher {
    registry: HookRegistry,
    log: ExecutionLog,
    input: ThreadSafeInputProvider,
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::with_input(Box::new(StdinProcessor::new()))
    }

    pub fn with_input(input: Box<dyn InputProvider>) -> Self {
        Self {
            registry: HookRegistry::build(),
            log: ExecutionLog::new(),
            input: Arc::new(Mutex::new(input)),
        }
    }

    pub fn execution_log(&self) -> &ExecutionLog {
        &self.log
    }

    /// Run a hook against the stdin payload.
    pub async fn run(&self, hook_id: &str) -> Result<RunReport, HookError> {
        let Some(def) = definition(hook_id) else {
            return Err(HookError::InvalidInput {
                message: format!("unknown hook id '{hook_id}' (see `hooks list`)"),
            });
        };
        let payload = {
            let mut guard = self.input.lock().await;
            guard.read_payload().await
        };
        Ok(self.run_with_payload(def, payload, true).await)
    }

    /// Run one definition against an explicit payload. `log` is false for
    /// profile runs, which report their own measurements.
    pub async fn run_with_payload(
        &self,
        def: &'static HookDefinition,
        payload: HookPayload,
        log: bool,
    ) -> RunReport {
        let start = Instant::now();
        let session = SessionTracker::from_payload(
            payload.session_id.as_deref(),
            payload.transcript_path.as_deref(),
        );
        let session_id = session.id().to_string();
        // A payload without a recognizable event is routed as the hook's
        // primary event (manual CLI runs often omit it)
        let event = payload.event().unwrap_or(def.events[0]);

        let outcome = self.lifecycle(def, payload, session).await;

        let (rendered, tag) = match outcome {
            Ok(outcome) => (render(event, &outcome), outcome.tag()),
            Err(e) => {
                // Engine defects are never presented as blocks
                tracing::error!("hook {} failed internally: {e}", def.id);
                (
                    RenderedResponse {
                        stdout: None,
                        stderr: Some(format!("hooks: internal error in {}: {e}", def.id)),
                        exit_code: ExitCode::GeneralError.code(),
                    },
                    "error".to_string(),
                )
            }
        };

        let duration = start.elapsed();
        if log {
            self.log.append(
                def.id,
                &ExecutionLogEntry {
                    timestamp: Utc::now(),
                    duration_ms: duration.as_millis() as u64,
                    exit_code: rendered.exit_code,
                    bytes_out: rendered.stdout.as_ref().map_or(0, |s| s.len() as u64),
                    bytes_err: rendered.stderr.as_ref().map_or(0, |s| s.len() as u64),
                    session_id: session_id.clone(),
                    outcome: tag.clone(),
                },
            );
        }

        RunReport {
            rendered,
            outcome_tag: tag,
            session_id,
            duration,
        }
    }

    async fn lifecycle(
        &self,
        def: &'static HookDefinition,
        payload: HookPayload,
        session: SessionTracker,
    ) -> Result<Outcome, HookError> {
        let event = payload.event().unwrap_or(def.events[0]);

        let subagent_probe = || {
            payload
                .transcript_path
                .as_deref()
                .and_then(|p| Transcript::load(p).ok())
                .map(|t| t.subagent_context())
                .unwrap_or(false)
        };
        if let Some(reason) = pre_execution_skip(def, event, &payload, &session, subagent_probe) {
            return Ok(Outcome::Skip(reason));
        }

        let config = Config::load(&payload.working_dir());
        let ctx = HookContext::new(def, payload, config, session);
        let budget = ctx.timeout() + DISPATCH_TIMEOUT_MARGIN;

        let hook = self
            .registry
            .get(def.id)
            .ok_or_else(|| HookError::InvalidInput {
                message: format!("no implementation registered for '{}'", def.id),
            })?;

        match tokio::time::timeout(budget, hook.run(&ctx)).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(HookError::Blocking { reason })) => Ok(Outcome::block(reason)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(Outcome::block(format!(
                "hook '{}' timed out after {}s",
                def.id,
                budget.as_secs()
            ))),
        }
    }
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
