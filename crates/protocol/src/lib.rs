//! # cf-protocol
//!
//! Shared data model and event definitions for clipflow.
//!
//! This crate defines the data structures used for:
//! - Process definitions and their ordered steps
//! - Execution history records
//! - Configuration files (TOML settings, Markdown items, YAML processes)
//! - Lifecycle events published by the executor
//!
//! ## Modules
//!
//! - [`process_models`]: `Process`, `ProcessStep` and their helpers
//! - [`item_models`]: Stored content items
//! - [`execution_models`]: Execution records and statuses
//! - [`update_models`]: Partial updates for processes and steps
//! - [`definition_models`]: Importable YAML process definitions
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Lifecycle events
//!
//! ## Design Principles
//!
//! - Minimal dependencies: only serde, chrono and ts-rs
//! - TypeScript generation: serializable types derive `TS` for client compatibility
//! - Independent compilation: no dependencies on other clipflow crates

pub mod config_models;
pub mod definition_models;
pub mod execution_models;
pub mod ipc;
pub mod item_models;
pub mod process_models;
pub mod update_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use definition_models::*;
pub use execution_models::*;
pub use ipc::*;
pub use item_models::*;
pub use process_models::*;
pub use update_models::*;
