//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines
//! global settings, content items, and process definitions into a single
//! configuration object.

use cf_protocol::{GlobalConfig, Item, ProcessDefinition};
use std::path::{Path, PathBuf};

/// Unified application configuration loaded from the `.clipflow/` directory.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Global settings
/// - `items/*.md`: Content items (front matter + body)
/// - `processes/*.yaml`: Importable process definitions
///
/// # Example
///
/// ```rust,no_run
/// use cf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} items and {} processes",
///          config.items.len(),
///          config.processes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// All items loaded from `items/*.md`, sorted by id.
    pub items: Vec<Item>,

    /// All process definitions loaded from `processes/*.yaml`, sorted by file name.
    pub processes: Vec<ProcessDefinition>,
}

impl AppConfig {
    /// The SQLite database file, resolved against the project `root`.
    ///
    /// `None` means the session should use an in-memory store.
    pub fn database_path(&self, root: &Path) -> Option<PathBuf> {
        self.global.database.as_ref().map(|db| {
            let path = Path::new(db);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        })
    }
}
