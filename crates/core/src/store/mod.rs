//! Persistence boundary for processes, steps and execution history.
//!
//! All durable mutation made by the manager and the executor goes through
//! the [`ProcessStore`] trait. Two implementations are provided:
//! - [`MemoryStore`]: process-local, used by tests and ephemeral sessions
//! - [`SqliteStore`]: durable, backed by a SQLite file

pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use cf_protocol::{
    ExecutionId, ExecutionRecord, ExecutionUpdate, Process, ProcessId, ProcessStep, ProcessUpdate,
    StepId, StepUpdate,
};

/// Durable CRUD for processes, their steps, and their execution history.
///
/// Processes returned by the store always carry their steps in ascending
/// `step_order`.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    /// Persist a process and all of its steps as one unit.
    ///
    /// `process.id` and step ids are ignored; fresh ids are assigned.
    async fn add_process(&self, process: &Process) -> StoreResult<ProcessId>;

    async fn get_process(&self, id: ProcessId) -> StoreResult<Option<Process>>;

    /// All processes, ordered by `pinned_order`, `order_index`, then `name`.
    async fn get_all_processes(
        &self,
        include_archived: bool,
        include_inactive: bool,
    ) -> StoreResult<Vec<Process>>;

    /// Apply a partial update and stamp `updated_at`.
    async fn update_process(&self, id: ProcessId, update: &ProcessUpdate) -> StoreResult<()>;

    /// Delete a process, cascading to its steps and history.
    async fn delete_process(&self, id: ProcessId) -> StoreResult<()>;

    /// Active, non-archived processes whose name, description or tags contain
    /// `query` (case-insensitive), most used first.
    async fn search_processes(&self, query: &str) -> StoreResult<Vec<Process>>;

    /// Pinned, active, non-archived processes by `pinned_order`.
    async fn get_pinned_processes(&self) -> StoreResult<Vec<Process>>;

    async fn add_step(&self, process_id: ProcessId, step: &ProcessStep) -> StoreResult<StepId>;

    async fn get_steps(&self, process_id: ProcessId) -> StoreResult<Vec<ProcessStep>>;

    async fn update_step(&self, step_id: StepId, update: &StepUpdate) -> StoreResult<()>;

    async fn delete_step(&self, step_id: StepId) -> StoreResult<()>;

    /// Set `step_order = position + 1` for each id, in the given order.
    ///
    /// `step_ids` must name every step of `process_id` exactly once;
    /// anything else fails with [`StoreError::InvalidStepOrder`] and changes
    /// nothing.
    async fn reorder_steps(&self, process_id: ProcessId, step_ids: &[StepId]) -> StoreResult<()>;

    /// Open a `running` record for a new run.
    async fn add_execution_history(
        &self,
        process_id: ProcessId,
        total_steps: u32,
    ) -> StoreResult<ExecutionId>;

    /// Finalize a record. Stamps `completed_at` for terminal statuses.
    async fn update_execution_history(
        &self,
        id: ExecutionId,
        update: &ExecutionUpdate,
    ) -> StoreResult<()>;

    /// The most recent records for a process, newest first.
    async fn get_process_execution_history(
        &self,
        process_id: ProcessId,
        limit: usize,
    ) -> StoreResult<Vec<ExecutionRecord>>;
}

/// Case-insensitive substring match over name, description and tags.
pub(crate) fn matches_query(process: &Process, query: &str) -> bool {
    let needle = query.to_lowercase();
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    contains(&process.name)
        || process.description.as_deref().is_some_and(contains)
        || contains(&process.tags.join(","))
}

/// Whether `requested` lists every id in `current` exactly once.
pub(crate) fn is_permutation(current: &[StepId], requested: &[StepId]) -> bool {
    let mut current = current.to_vec();
    let mut requested = requested.to_vec();
    current.sort_unstable();
    requested.sort_unstable();
    current == requested
}

/// Ordering used by `get_all_processes`.
pub(crate) fn listing_order(a: &Process, b: &Process) -> std::cmp::Ordering {
    a.pinned_order
        .cmp(&b.pinned_order)
        .then(a.order_index.cmp(&b.order_index))
        .then_with(|| a.name.cmp(&b.name))
}
