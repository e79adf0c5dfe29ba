//! Error types for process management.

use crate::store::StoreError;
use cf_protocol::{ItemId, ProcessId, StepId};
use thiserror::Error;

/// A process failed validation. Nothing was written.
///
/// Rules are checked in declaration order and only the first failure is
/// reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Process name is required")]
    NameRequired,

    #[error("Process name is too long (max 200 characters)")]
    NameTooLong,

    #[error("Invalid execution mode. Must be one of: sequential, parallel, manual")]
    InvalidExecutionMode(String),

    #[error("Delay between steps cannot be negative")]
    NegativeDelay,

    #[error("Delay between steps is too long (max 60 seconds)")]
    DelayTooLong,
}

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Process ID is required for update")]
    MissingId,

    #[error("Process {0} not found")]
    NotFound(ProcessId),

    #[error("Step {0} not found")]
    StepNotFound(StepId),

    #[error("Step order for process {0} must list each of its steps exactly once")]
    InvalidStepOrder(ProcessId),

    #[error("Item {0} not found")]
    ItemNotFound(ItemId),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ManagerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProcessNotFound(id) => ManagerError::NotFound(id),
            StoreError::StepNotFound(id) => ManagerError::StepNotFound(id),
            StoreError::InvalidStepOrder(id) => ManagerError::InvalidStepOrder(id),
            other => ManagerError::Store(other),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
