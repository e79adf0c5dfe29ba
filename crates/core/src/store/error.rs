//! Error types for the persistence layer.

use cf_protocol::{ExecutionId, ProcessId, StepId};
use thiserror::Error;

/// Errors that can occur while reading or writing durable state.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No process with this id exists.
    #[error("Process {0} not found")]
    ProcessNotFound(ProcessId),

    /// No step with this id exists.
    #[error("Step {0} not found")]
    StepNotFound(StepId),

    /// No execution record with this id exists.
    #[error("Execution record {0} not found")]
    ExecutionNotFound(ExecutionId),

    /// A reorder list is not a permutation of the process's steps.
    #[error("Step order for process {0} must list each of its steps exactly once")]
    InvalidStepOrder(ProcessId),

    /// The execution record was already finalized.
    #[error("Execution record {0} is already finalized")]
    ExecutionFinalized(ExecutionId),

    /// The underlying SQLite database reported an error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be mapped back into the data model.
    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },

    /// The blocking task running a database call panicked or was cancelled.
    #[error("Database worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// A thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Type alias for Result with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
