//! Configuration loading and management.
//!
//! This module loads the project configuration from the `.clipflow/`
//! directory: global settings, content items and process definitions.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, CONFIG_DIR};
pub use models::AppConfig;
