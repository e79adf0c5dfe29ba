//! # cf-core
//!
//! Process management and execution engine for clipflow.
//!
//! This crate provides:
//! - Configuration loading from the `.clipflow/` directory
//! - Persistence of processes and execution history
//! - Validation, CRUD and statistics for processes
//! - The sequential process executor with pause, resume and cancel
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`init`]: Scaffolding of a new `.clipflow/` directory
//! - [`store`]: `ProcessStore` trait with in-memory and SQLite implementations
//! - [`items`]: Item lookup used to snapshot step content
//! - [`sink`]: Destinations for delivered content
//! - [`manager`]: `ProcessManager`
//! - [`engine`]: `ProcessExecutor`
//! - [`runtime`]: Wiring of the above for one project

pub mod config;
pub mod engine;
pub mod init;
pub mod items;
pub mod manager;
pub mod runtime;
pub mod sink;
pub mod store;
