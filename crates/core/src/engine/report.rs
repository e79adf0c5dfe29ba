//! Outcomes returned by the executor.

use cf_protocol::{ExecutionId, ExecutionStatus, ProcessId};
use serde::Serialize;
use thiserror::Error;

/// Reasons a run is refused before it starts. None of them create an
/// execution record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("Another process is already running")]
    AlreadyRunning,

    #[error("Process has not been saved")]
    NotPersisted,

    #[error("Process {0} has no enabled steps")]
    NoEnabledSteps(ProcessId),
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub success: bool,
    pub message: String,
}

impl StepResult {
    pub(crate) fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Final state of a run that was started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub process_id: ProcessId,
    /// `None` only if the execution record itself could not be created.
    pub execution_id: Option<ExecutionId>,
    pub status: ExecutionStatus,
    pub message: String,
    pub completed_steps: u32,
    pub failed_steps: u32,
    pub total_steps: u32,
    pub duration_ms: i64,
    /// A cancellation was requested at some point during the run, even if
    /// the run reached the end before observing it.
    pub cancel_requested: bool,
}

impl RunReport {
    /// The run reached the end. Optional steps may still have failed.
    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }
}

/// Result of [`execute_multiple_processes`](super::ProcessExecutor::execute_multiple_processes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Number of processes that were attempted.
    pub attempted: usize,
    pub succeeded: usize,
    /// Names of processes that did not complete, in run order.
    pub failed: Vec<String>,
    /// The batch stopped early because a run was cancelled.
    pub cancelled: bool,
}

impl BatchReport {
    /// True when at least one process ran and none failed.
    pub fn success(&self) -> bool {
        self.attempted > 0 && self.failed.is_empty()
    }
}
