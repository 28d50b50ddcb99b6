use std::fmt;
use std::time::Duration;

use insdraw_protocol::constants::{
    CANCELLED_EXIT_CODE, DEFAULT_BATCH_TIMEOUT, DEFAULT_CHUNK_SIZE, DEFAULT_SEND_DELAY,
    TIMEOUT_EXIT_CODE,
};

/// Tuning for one delivery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Pause after each line written to a streaming session.
    pub send_delay: Duration,
    /// Primitives per chunked invocation (values below 1 are treated as 1).
    pub chunk_size: usize,
    /// Upper bound for one chunked invocation, and for the streaming
    /// session to exit once its input is closed.
    pub batch_timeout: Duration,
    /// Already-written primitives to resend when falling back after a
    /// mid-stream write failure.
    pub fallback_replay: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_delay: DEFAULT_SEND_DELAY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            fallback_replay: 0,
        }
    }
}

impl DeliveryConfig {
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// How the primitives reached the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Nothing had to be sent.
    Unused,
    Streaming,
    Chunked,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unused => "unused",
            Self::Streaming => "streaming",
            Self::Chunked => "chunked",
        })
    }
}

/// Terminal outcome of a delivery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Completed,
    Cancelled,
    Failed { code: i32, message: String },
}

/// What [`DeliveryEngine::deliver`](crate::DeliveryEngine::deliver) returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
    pub mode: TransportMode,
    /// Primitives confirmed delivered.
    pub sent: usize,
}

impl DeliveryReport {
    pub fn is_success(&self) -> bool {
        self.outcome == DeliveryOutcome::Completed
    }

    /// Machine-checkable code: 0 on success, 130 when cancelled, 124 on
    /// timeout, otherwise the transport's exit code.
    pub fn return_code(&self) -> i32 {
        match &self.outcome {
            DeliveryOutcome::Completed => 0,
            DeliveryOutcome::Cancelled => CANCELLED_EXIT_CODE,
            DeliveryOutcome::Failed { code, .. } => *code,
        }
    }

    /// One-line human-readable summary of the outcome.
    pub fn diagnostic(&self) -> String {
        match &self.outcome {
            DeliveryOutcome::Completed => "ok".into(),
            DeliveryOutcome::Cancelled => "cancelled".into(),
            DeliveryOutcome::Failed { code, message } if *code == TIMEOUT_EXIT_CODE => {
                format!("timeout: {message}")
            }
            DeliveryOutcome::Failed { message, .. } => message.clone(),
        }
    }
}

/// Exit status of a streaming session after its input was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExit {
    pub code: i32,
    pub stderr: String,
}

/// Result of one chunked invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub code: i32,
    pub stderr: String,
    pub timed_out: bool,
}

impl BatchResult {
    pub fn ok() -> Self {
        Self {
            code: 0,
            stderr: String::new(),
            timed_out: false,
        }
    }
}
