use crate::mover::{MoveOutcome, RunSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Importance of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

/// Human-readable progress line produced by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusMessage {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Events sent from a running pipeline to the invoking surface
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Run accepted and worker started
    Started { run_id: String },

    /// Progress or diagnostic line
    Status(StatusMessage),

    /// Final result for one candidate file
    Outcome(MoveOutcome),

    /// Run completed; per-file errors may still be present
    Finished(RunSummary),

    /// Run aborted during setup, nothing was moved
    Aborted(String),
}
