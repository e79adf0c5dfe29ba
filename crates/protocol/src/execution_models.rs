//! Execution history models.
//!
//! One [`ExecutionRecord`] is written per run: created with status
//! `Running` when the run starts and finalized exactly once at its terminal
//! transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::process_models::ProcessId;

/// Identifier of a persisted execution record.
pub type ExecutionId = i64;

/// Lifecycle status of a single run.
///
/// Running -> Completed | Failed | Cancelled
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// The run is in progress.
    Running,

    /// The run reached the end of its steps. Optional steps may still have failed.
    Completed,

    /// A required step failed, or the run hit an internal fault.
    Failed,

    /// The user cancelled the run at a step boundary.
    Cancelled,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ExecutionStatus::Running),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            "cancelled" => Ok(ExecutionStatus::Cancelled),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

/// Append-only audit row for one invocation of a process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    pub process_id: ProcessId,
    pub status: ExecutionStatus,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub failed_steps: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
}

/// Terminal values written to an [`ExecutionRecord`] when a run ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionUpdate {
    pub status: ExecutionStatus,
    pub completed_steps: u32,
    pub failed_steps: u32,
    pub duration_ms: i64,
    pub error_message: Option<String>,
}
