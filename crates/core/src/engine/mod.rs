//! Process execution engine.
//!
//! The [`ProcessExecutor`] runs the enabled steps of one process at a time,
//! in ascending `step_order`, delivering each step's content to the
//! configured [`ContentSink`]. Pause and cancel requests are honored only at
//! step boundaries.

pub mod report;
pub mod state;

pub use report::{BatchReport, ExecuteError, RunReport, StepResult};
pub use state::ExecutorState;

use crate::sink::ContentSink;
use crate::store::{ProcessStore, StoreError, StoreResult};
use anyhow::Context;
use cf_protocol::{
    ExecutionEvent, ExecutionRecord, ExecutionStatus, ExecutionUpdate, Process, ProcessId,
    ProcessStep, ProcessUpdate,
};
use chrono::Utc;
use futures::FutureExt;
use state::RunSlot;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

/// Default buffer size of the lifecycle event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// How a started run ended.
enum Outcome {
    Completed,
    Failed(String),
    Cancelled,
}

impl Outcome {
    fn status(&self) -> ExecutionStatus {
        match self {
            Outcome::Completed => ExecutionStatus::Completed,
            Outcome::Failed(_) => ExecutionStatus::Failed,
            Outcome::Cancelled => ExecutionStatus::Cancelled,
        }
    }

    fn into_message(self) -> String {
        match self {
            Outcome::Completed => "Completed successfully".to_string(),
            Outcome::Failed(message) => message,
            Outcome::Cancelled => "Cancelled by user".to_string(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "step panicked".to_string())
}

/// Runs processes one at a time and records each run.
///
/// An executor owns a single run slot. Control operations
/// ([`pause_execution`](Self::pause_execution),
/// [`resume_execution`](Self::resume_execution),
/// [`cancel_execution`](Self::cancel_execution)) are synchronous and may be
/// called from any task while a run is in progress; share the executor
/// behind an `Arc` to do so.
pub struct ProcessExecutor {
    store: Arc<dyn ProcessStore>,
    sink: Option<Arc<dyn ContentSink>>,
    events: broadcast::Sender<ExecutionEvent>,
    state: watch::Sender<ExecutorState>,
}

impl ProcessExecutor {
    /// Create an executor.
    ///
    /// # Arguments
    ///
    /// * `store` - Where execution records and usage statistics are written
    /// * `sink` - Destination for step content; `None` runs steps without delivering anything
    pub fn new(store: Arc<dyn ProcessStore>, sink: Option<Arc<dyn ContentSink>>) -> Self {
        Self::with_event_capacity(store, sink, DEFAULT_EVENT_CAPACITY)
    }

    /// Create an executor whose event channel buffers `capacity` events per
    /// subscriber. Slow subscribers lose the oldest events beyond that.
    pub fn with_event_capacity(
        store: Arc<dyn ProcessStore>,
        sink: Option<Arc<dyn ContentSink>>,
        capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        let (state, _) = watch::channel(ExecutorState::default());
        info!("ProcessExecutor initialized");
        Self {
            store,
            sink,
            events,
            state,
        }
    }

    /// Subscribe to lifecycle events. Each subscriber sees every event sent
    /// after it subscribed, in emission order.
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.events.subscribe()
    }

    /// Observe state changes (running, paused, counters, ...).
    pub fn watch_state(&self) -> watch::Receiver<ExecutorState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ExecutorState {
        self.state.borrow().clone()
    }

    /// Execute the enabled steps of `process` in order.
    ///
    /// Steps are taken from `process` as given: changes made to the stored
    /// process while the run is active are not seen.
    ///
    /// # Returns
    ///
    /// A [`RunReport`] for every run that started, whatever its outcome.
    /// Internal faults (for example, the store refusing the execution
    /// record) are logged and reported as a `Failed` run.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError`] without creating an execution record if
    /// another run is active, the process was never saved, or it has no
    /// enabled steps.
    pub async fn execute_process(&self, process: &Process) -> Result<RunReport, ExecuteError> {
        if self.is_running() {
            warn!("Cannot execute process: another process is already running");
            return Err(ExecuteError::AlreadyRunning);
        }

        let Some(process_id) = process.id else {
            error!("Cannot execute '{}': process has not been saved", process.name);
            return Err(ExecuteError::NotPersisted);
        };

        let steps = process.enabled_steps();
        if steps.is_empty() {
            warn!("Process {} has no enabled steps", process_id);
            return Err(ExecuteError::NoEnabledSteps(process_id));
        }

        let Some(_slot) = RunSlot::acquire(&self.state, process_id) else {
            warn!("Cannot execute process: another process is already running");
            return Err(ExecuteError::AlreadyRunning);
        };

        let started = Instant::now();
        let total = steps.len() as u32;
        let run = AssertUnwindSafe(self.run(process, process_id, &steps, started)).catch_unwind();
        let report = match run.await {
            Ok(Ok(report)) => report,
            Ok(Err(fault)) => {
                error!("Error executing process {}: {:#}", process_id, fault);
                let outcome = Outcome::Failed(format!("Error: {fault}"));
                self.finish(process_id, total, outcome, started).await
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!("Process {} panicked during execution: {}", process_id, reason);
                let outcome = Outcome::Failed(format!("Error: {reason}"));
                self.finish(process_id, total, outcome, started).await
            }
        };
        Ok(report)
    }

    async fn run(
        &self,
        process: &Process,
        process_id: ProcessId,
        steps: &[&ProcessStep],
        started: Instant,
    ) -> anyhow::Result<RunReport> {
        let total = steps.len() as u32;

        let execution_id = self
            .store
            .add_execution_history(process_id, total)
            .await
            .context("failed to create execution record")?;
        self.state
            .send_modify(|s| s.current_execution_id = Some(execution_id));

        self.emit(ExecutionEvent::ExecutionStarted {
            process_id,
            name: process.name.clone(),
        });
        info!(
            "Starting execution of process: {} ({} steps)",
            process.name, total
        );

        for (index, step) in steps.iter().enumerate() {
            if self.cancel_requested() {
                info!("Process execution cancelled by user");
                return Ok(self.finish(process_id, total, Outcome::Cancelled, started).await);
            }

            if self.is_paused() {
                info!("Execution paused before step {}", step.step_order);
                self.wait_until(|s| !s.paused || s.cancelled).await;
                if self.cancel_requested() {
                    info!("Process execution cancelled while paused");
                    return Ok(self.finish(process_id, total, Outcome::Cancelled, started).await);
                }
            }

            let result = self.execute_step(step, process_id).await;
            let (completed, _) = self.record_step(result.success);

            if !result.success && !step.is_optional {
                error!("Required step failed, stopping execution: {}", result.message);
                let outcome =
                    Outcome::Failed(format!("Failed at step {}: {}", step.step_order, result.message));
                return Ok(self.finish(process_id, total, outcome, started).await);
            }

            self.emit(ExecutionEvent::ExecutionProgress {
                process_id,
                completed,
                total,
            });

            let is_last = index + 1 == steps.len();
            if !is_last && process.delay_between_steps > 0 {
                self.delay(process.delay_between_steps).await;
            }
        }

        let (completed, _) = self.get_progress();
        info!(
            "Process {} completed: {}/{} steps successful",
            process.name, completed, total
        );
        Ok(self.finish(process_id, total, Outcome::Completed, started).await)
    }

    /// Execute a single step: announce it, deliver its content, report back.
    ///
    /// Steps with empty content, or an executor without a sink, succeed
    /// without delivering anything. `wait_for_confirmation` is
    /// auto-confirmed.
    pub async fn execute_step(&self, step: &ProcessStep, process_id: ProcessId) -> StepResult {
        let step_order = step.step_order;
        let label = step.display_label().to_string();
        self.emit(ExecutionEvent::StepStarted {
            process_id,
            step_order,
            label: label.clone(),
        });
        info!("Executing step {}: {}", step_order, label);

        if let Some(sink) = self.sink.as_ref().filter(|_| !step.item_content.is_empty()) {
            if let Err(e) = sink.deliver(&step.item_content).await {
                error!("Failed to deliver content for step {}: {}", step_order, e);
                let result = StepResult::failed(format!("Failed to deliver content: {e}"));
                self.emit_step_completed(process_id, step_order, &result);
                return result;
            }
            if step.item_is_sensitive {
                debug!("Delivered sensitive content for step {}", step_order);
            } else {
                let preview: String = step.item_content.chars().take(50).collect();
                debug!("Delivered: {}...", preview);
            }
        }

        if step.wait_for_confirmation {
            info!(
                "Step {} requires confirmation (auto-confirmed in this version)",
                step_order
            );
        }

        let result = StepResult::ok(format!("Step {step_order} completed"));
        self.emit_step_completed(process_id, step_order, &result);
        result
    }

    /// Shared terminal transition: finalize the record, count the use,
    /// announce completion.
    ///
    /// Store failures here are logged and do not change the outcome.
    async fn finish(
        &self,
        process_id: ProcessId,
        total: u32,
        outcome: Outcome,
        started: Instant,
    ) -> RunReport {
        let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        let snapshot = self.state();
        let status = outcome.status();
        let success = status == ExecutionStatus::Completed;
        let message = outcome.into_message();

        if let Some(execution_id) = snapshot.current_execution_id {
            let update = ExecutionUpdate {
                status,
                completed_steps: snapshot.completed_steps,
                failed_steps: snapshot.failed_steps,
                duration_ms,
                error_message: (!success).then(|| message.clone()),
            };
            if let Err(e) = self
                .store
                .update_execution_history(execution_id, &update)
                .await
            {
                error!("Error finalizing execution record {}: {}", execution_id, e);
            }
        }

        if let Err(e) = self.bump_usage(process_id).await {
            error!("Error updating usage for process {}: {}", process_id, e);
        }

        self.emit(ExecutionEvent::ExecutionCompleted {
            process_id,
            success,
            message: message.clone(),
        });
        info!("Execution completed: {} (Duration: {}ms)", message, duration_ms);

        RunReport {
            process_id,
            execution_id: snapshot.current_execution_id,
            status,
            message,
            completed_steps: snapshot.completed_steps,
            failed_steps: snapshot.failed_steps,
            total_steps: total,
            duration_ms,
            cancel_requested: snapshot.cancelled,
        }
    }

    async fn bump_usage(&self, process_id: ProcessId) -> StoreResult<()> {
        let process = self
            .store
            .get_process(process_id)
            .await?
            .ok_or(StoreError::ProcessNotFound(process_id))?;
        let update = ProcessUpdate::usage(process.use_count.saturating_add(1), Utc::now());
        self.store.update_process(process_id, &update).await
    }

    /// Count one finished step; returns `(completed, failed)`.
    fn record_step(&self, success: bool) -> (u32, u32) {
        let mut counts = (0, 0);
        self.state.send_modify(|s| {
            if success {
                s.completed_steps += 1;
            } else {
                s.failed_steps += 1;
            }
            counts = (s.completed_steps, s.failed_steps);
        });
        counts
    }

    async fn wait_until(&self, condition: impl FnMut(&ExecutorState) -> bool + Send) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns once the
        // condition holds.
        let _ = rx.wait_for(condition).await.map(|_| ());
    }

    /// Sleep between steps. Wakes early on cancellation.
    async fn delay(&self, millis: i64) {
        let sleep = tokio::time::sleep(Duration::from_millis(millis.unsigned_abs()));
        tokio::select! {
            _ = sleep => {}
            _ = self.wait_until(|s| s.cancelled) => {
                debug!("Inter-step delay interrupted by cancellation");
            }
        }
    }

    fn cancel_requested(&self) -> bool {
        self.state.borrow().cancelled
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn emit(&self, event: ExecutionEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn emit_step_completed(&self, process_id: ProcessId, step_order: u32, result: &StepResult) {
        self.emit(ExecutionEvent::StepCompleted {
            process_id,
            step_order,
            success: result.success,
            message: result.message.clone(),
        });
    }

    // Control

    /// Hold the active run before its next step. No effect when idle
    /// or already paused. Returns whether the state changed.
    pub fn pause_execution(&self) -> bool {
        let changed = self.state.send_if_modified(|s| {
            if s.running && !s.paused {
                s.paused = true;
                true
            } else {
                false
            }
        });
        if changed {
            info!("Execution paused");
        }
        changed
    }

    /// Let a paused run continue. No effect unless running and paused.
    pub fn resume_execution(&self) -> bool {
        let changed = self.state.send_if_modified(|s| {
            if s.running && s.paused {
                s.paused = false;
                true
            } else {
                false
            }
        });
        if changed {
            info!("Execution resumed");
        }
        changed
    }

    /// Cancel the active run at its next step boundary, waking it if paused.
    /// No effect when idle.
    pub fn cancel_execution(&self) -> bool {
        let changed = self.state.send_if_modified(|s| {
            if s.running && (!s.cancelled || s.paused) {
                s.cancelled = true;
                s.paused = false;
                true
            } else {
                false
            }
        });
        if changed {
            info!("Execution cancelled");
        }
        changed
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    pub fn get_current_process_id(&self) -> Option<ProcessId> {
        self.state.borrow().current_process_id
    }

    /// `(completed, completed + failed)` for the active or most recent run.
    pub fn get_progress(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (
            state.completed_steps,
            state.completed_steps + state.failed_steps,
        )
    }

    // Batch

    /// Run `processes` one after another, never overlapping.
    ///
    /// `on_complete(process, success, index, total)` is called after each
    /// process, with a 1-based `index`. The batch stops after a run that was
    /// cancelled.
    pub async fn execute_multiple_processes<F>(
        &self,
        processes: &[Process],
        mut on_complete: F,
    ) -> BatchReport
    where
        F: FnMut(&Process, bool, usize, usize) + Send,
    {
        let mut report = BatchReport::default();
        if processes.is_empty() {
            warn!("No processes to execute");
            return report;
        }

        let total = processes.len();
        info!("Starting batch execution of {} processes", total);

        for (offset, process) in processes.iter().enumerate() {
            let index = offset + 1;
            info!("Executing process {}/{}: {}", index, total, process.name);
            report.attempted += 1;

            let (success, stop) = match self.execute_process(process).await {
                Ok(run) => (
                    run.success(),
                    run.cancel_requested || run.status == ExecutionStatus::Cancelled,
                ),
                Err(e) => {
                    warn!("Process '{}' was not started: {}", process.name, e);
                    (false, false)
                }
            };

            if success {
                report.succeeded += 1;
            } else {
                warn!("Process '{}' failed", process.name);
                report.failed.push(process.name.clone());
            }

            on_complete(process, success, index, total);

            if stop {
                info!("Batch execution cancelled");
                report.cancelled = true;
                break;
            }
        }

        if report.failed.is_empty() {
            info!("Batch execution completed successfully");
        } else {
            warn!(
                "Batch execution completed with {} failures: {:?}",
                report.failed.len(),
                report.failed
            );
        }
        report
    }

    // History

    /// The most recent runs of a process, newest first. Store errors are
    /// logged and yield an empty list.
    pub async fn get_execution_history(
        &self,
        process_id: ProcessId,
        limit: usize,
    ) -> Vec<ExecutionRecord> {
        match self
            .store
            .get_process_execution_history(process_id, limit)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                error!("Error getting execution history: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get_last_execution_status(&self, process_id: ProcessId) -> Option<ExecutionRecord> {
        self.get_execution_history(process_id, 1).await.into_iter().next()
    }
}
