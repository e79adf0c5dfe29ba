//! Executor-private run state and the run slot guard.

use cf_protocol::{ExecutionId, ProcessId};
use tokio::sync::watch;

/// Mutable state of one executor.
///
/// Lives inside a `watch` channel: control operations modify it in place and
/// the run loop awaits changes while paused or sleeping between steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorState {
    pub running: bool,
    pub paused: bool,
    pub cancelled: bool,
    pub completed_steps: u32,
    pub failed_steps: u32,
    pub current_process_id: Option<ProcessId>,
    pub current_execution_id: Option<ExecutionId>,
}

/// Exclusive claim on an executor's single run slot.
///
/// Dropping the slot clears the flags and current ids, whatever path the run
/// took to get there. Counters are kept so progress can still be read after
/// the run ends.
pub(crate) struct RunSlot<'a> {
    state: &'a watch::Sender<ExecutorState>,
}

impl<'a> RunSlot<'a> {
    /// Claim the slot for `process_id`, resetting flags and counters.
    ///
    /// Returns `None` without touching the state if a run is already active.
    pub(crate) fn acquire(
        state: &'a watch::Sender<ExecutorState>,
        process_id: ProcessId,
    ) -> Option<Self> {
        let mut acquired = false;
        state.send_if_modified(|s| {
            if s.running {
                return false;
            }
            *s = ExecutorState {
                running: true,
                current_process_id: Some(process_id),
                ..ExecutorState::default()
            };
            acquired = true;
            true
        });
        acquired.then_some(Self { state })
    }
}

impl Drop for RunSlot<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            s.running = false;
            s.paused = false;
            s.cancelled = false;
            s.current_process_id = None;
            s.current_execution_id = None;
        });
    }
}
