//! Draw-run result and event types.

use insdraw_delivery::{DeliveryOutcome, DeliveryReport, TransportMode};
use insdraw_protocol::constants::CANCELLED_EXIT_CODE;

use crate::error::{DrawError, RESERVED_CODES, TRANSPORT_ERROR_CODE};

/// Notification published while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawEvent {
    /// Human-readable status line.
    Log { message: String },
    /// Delivery progress in percent.
    Progress { percent: u8 },
    Completed,
    Cancelled,
    Failed { code: i32, message: String },
}

/// How a draw run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Completed,
    Cancelled,
    Failed { code: i32, message: String },
}

/// Result of [`DrawOrchestrator::run`](crate::DrawOrchestrator::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawResult {
    pub outcome: DrawOutcome,
    /// Primitives planned for the run (0 if it aborted before planning).
    pub primitives: usize,
    /// Primitives confirmed delivered.
    pub sent: usize,
    /// Transport used, if delivery started.
    pub mode: Option<TransportMode>,
}

impl DrawResult {
    pub(crate) fn aborted(err: &DrawError) -> Self {
        Self {
            outcome: DrawOutcome::Failed {
                code: err.exit_code(),
                message: err.to_string(),
            },
            primitives: 0,
            sent: 0,
            mode: None,
        }
    }

    pub(crate) fn delivered(primitives: usize, report: DeliveryReport) -> Self {
        let outcome = match report.outcome {
            DeliveryOutcome::Completed => DrawOutcome::Completed,
            DeliveryOutcome::Cancelled => DrawOutcome::Cancelled,
            // A device status equal to one of the run's own codes would be
            // read as that abort reason.
            DeliveryOutcome::Failed { code, message } if RESERVED_CODES.contains(&code) => {
                DrawOutcome::Failed {
                    code: TRANSPORT_ERROR_CODE,
                    message: format!("device shell exited with status {code}: {message}"),
                }
            }
            DeliveryOutcome::Failed { code, message } => DrawOutcome::Failed { code, message },
        };
        Self {
            outcome,
            primitives,
            sent: report.sent,
            mode: Some(report.mode),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == DrawOutcome::Completed
    }

    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            DrawOutcome::Completed => 0,
            DrawOutcome::Cancelled => CANCELLED_EXIT_CODE,
            DrawOutcome::Failed { code, .. } => *code,
        }
    }

    pub fn diagnostic(&self) -> String {
        match &self.outcome {
            DrawOutcome::Completed => "ok".into(),
            DrawOutcome::Cancelled => "cancelled".into(),
            DrawOutcome::Failed { message, .. } => message.clone(),
        }
    }

    /// Terminal event matching this result.
    pub(crate) fn event(&self) -> DrawEvent {
        match &self.outcome {
            DrawOutcome::Completed => DrawEvent::Completed,
            DrawOutcome::Cancelled => DrawEvent::Cancelled,
            DrawOutcome::Failed { code, message } => DrawEvent::Failed {
                code: *code,
                message: message.clone(),
            },
        }
    }
}
