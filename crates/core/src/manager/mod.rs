//! Process management: CRUD, validation, step bookkeeping and statistics.

pub mod error;
pub mod process_manager;
pub mod stats;
pub mod validation;

pub use error::{ManagerError, ManagerResult, ValidationError};
pub use process_manager::{ProcessManager, DEFAULT_STATS_WINDOW};
pub use stats::ProcessStats;
pub use validation::validate_process;
