//! Bounded stdin reader for hook payloads
//!
//! Reads at most 1 MiB with a per-read idle timeout and an overall budget.
//! Any failure — timeout, oversize input, malformed JSON — degrades to the
//! default (empty) payload: a hook invoked with garbage input must still
//! produce its one response and one log line.

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, stdin};

use claudekit_core::constants::{MAX_PAYLOAD_BYTES, STDIN_IDLE_TIMEOUT, STDIN_TOTAL_TIMEOUT};

use crate::io::HookPayload;

/// Reusable-buffer stdin processor.
pub struct StdinProcessor {
    buffer: BytesMut,
    read_buffer: Vec<u8>,
}

impl StdinProcessor {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            read_buffer: vec![0u8; 8192],
        }
    }

    /// Read and parse the payload. Never fails.
    pub async fn read_payload(&mut self) -> HookPayload {
        let raw = match tokio::time::timeout(STDIN_TOTAL_TIMEOUT, self.read_to_buffer()).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(reason)) => {
                tracing::debug!("stdin read degraded to empty payload: {reason}");
                return HookPayload::default();
            }
            Err(_) => {
                tracing::debug!("stdin read exceeded total budget; using empty payload");
                return HookPayload::default();
            }
        };
        if raw.is_empty() {
            return HookPayload::default();
        }
        match serde_json::from_slice(raw) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!("malformed payload JSON: {e}; using empty payload");
                HookPayload::default()
            }
        }
    }

    async fn read_to_buffer(&mut self) -> Result<&[u8], String> {
        self.buffer.clear();
        let mut stdin = stdin();
        loop {
            let n = tokio::time::timeout(STDIN_IDLE_TIMEOUT, stdin.read(&mut self.read_buffer))
                .await
                .map_err(|_| "idle timeout".to_string())?
                .map_err(|e| e.to_string())?;
            if n == 0 {
                break;
            }
            if self.buffer.len() + n > MAX_PAYLOAD_BYTES {
                return Err(format!("payload exceeds {MAX_PAYLOAD_BYTES} byte cap"));
            }
            self.buffer.extend_from_slice(&self.read_buffer[..n]);
        }
        Ok(&self.buffer)
    }
}

impl Default for StdinProcessor {
    fn default() -> Self {
        Self::new()
    }
}
