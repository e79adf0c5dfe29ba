use cf_protocol::{ExecutionRecord, ExecutionStatus, Process, ProcessId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Usage and reliability summary for one process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessStats {
    pub process_id: ProcessId,
    pub name: String,
    pub total_steps: usize,
    pub enabled_steps: usize,
    pub optional_steps: usize,
    pub use_count: u32,
    pub last_used: Option<DateTime<Utc>>,
    pub total_executions: usize,
    pub successful_executions: usize,
    pub failed_executions: usize,
    /// Percentage in `0.0..=100.0`; zero when there is no history.
    pub success_rate: f64,
    /// Mean over records that have a duration; zero when none do.
    pub avg_duration_ms: f64,
    pub is_pinned: bool,
    pub is_archived: bool,
}

impl ProcessStats {
    /// Summarize `process` over `history`, which is expected to already be
    /// limited to the window of interest.
    pub fn from_history(process_id: ProcessId, process: &Process, history: &[ExecutionRecord]) -> Self {
        let total_executions = history.len();
        let successful_executions = history
            .iter()
            .filter(|r| r.status == ExecutionStatus::Completed)
            .count();
        let failed_executions = history
            .iter()
            .filter(|r| r.status == ExecutionStatus::Failed)
            .count();

        let success_rate = if total_executions > 0 {
            successful_executions as f64 / total_executions as f64 * 100.0
        } else {
            0.0
        };

        let durations: Vec<i64> = history.iter().filter_map(|r| r.duration_ms).collect();
        let avg_duration_ms = if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<i64>() as f64 / durations.len() as f64
        };

        Self {
            process_id,
            name: process.name.clone(),
            total_steps: process.step_count(),
            enabled_steps: process.enabled_steps().len(),
            optional_steps: process.optional_steps().len(),
            use_count: process.use_count,
            last_used: process.last_used,
            total_executions,
            successful_executions,
            failed_executions,
            success_rate,
            avg_duration_ms,
            is_pinned: process.is_pinned,
            is_archived: process.is_archived,
        }
    }
}
