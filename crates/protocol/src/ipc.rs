//! Execution lifecycle events.
//!
//! The executor publishes an [`ExecutionEvent`] at every lifecycle
//! transition. Any number of subscribers may listen; each one sees the
//! events of a run in the order they were emitted.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "stepCompleted",
//!   "payload": {
//!     "process_id": 7,
//!     "step_order": 2,
//!     "success": true,
//!     "message": "Step 2 completed"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::process_models::ProcessId;

/// Events sent from the executor to its subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ExecutionEvent {
    /// A run has started.
    ExecutionStarted { process_id: ProcessId, name: String },

    /// A step is about to deliver its content.
    StepStarted {
        process_id: ProcessId,
        step_order: u32,
        label: String,
    },

    /// A step finished, successfully or not.
    StepCompleted {
        process_id: ProcessId,
        step_order: u32,
        success: bool,
        message: String,
    },

    /// Emitted after every step that did not abort the run.
    ExecutionProgress {
        process_id: ProcessId,
        completed: u32,
        total: u32,
    },

    /// The run reached a terminal state.
    ExecutionCompleted {
        process_id: ProcessId,
        success: bool,
        message: String,
    },
}

impl ExecutionEvent {
    pub fn process_id(&self) -> ProcessId {
        match self {
            ExecutionEvent::ExecutionStarted { process_id, .. }
            | ExecutionEvent::StepStarted { process_id, .. }
            | ExecutionEvent::StepCompleted { process_id, .. }
            | ExecutionEvent::ExecutionProgress { process_id, .. }
            | ExecutionEvent::ExecutionCompleted { process_id, .. } => *process_id,
        }
    }

    /// Whether this event ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionEvent::ExecutionCompleted { .. })
    }
}
