//! Wiring of the collaborators for one `.clipflow/` project.
//!
//! The [`Runtime`] loads configuration, opens the configured store, builds
//! the item catalog and hands out a [`ProcessManager`] and
//! [`ProcessExecutor`]s that share them.

use crate::config::{load_config, AppConfig, ConfigError};
use crate::engine::ProcessExecutor;
use crate::items::ItemCatalog;
use crate::manager::{ManagerError, ProcessManager};
use crate::sink::ContentSink;
use crate::store::{MemoryStore, ProcessStore, SqliteStore, StoreError};
use cf_protocol::ProcessId;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error("Failed to create directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// What [`Runtime::import_definitions`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Newly created processes, as `(id, name)`.
    pub created: Vec<(ProcessId, String)>,
    /// Names of definitions skipped because a process with that name exists.
    pub skipped: Vec<String>,
}

/// The loaded project: configuration plus the shared store and catalog.
pub struct Runtime {
    root: PathBuf,
    config: AppConfig,
    store: Arc<dyn ProcessStore>,
    items: Arc<ItemCatalog>,
    manager: ProcessManager,
}

impl Runtime {
    /// Load `.clipflow/` under `root` and open its store.
    pub async fn load(root: &Path) -> RuntimeResult<Self> {
        let config = load_config(root).await?;
        Self::from_config(root, config)
    }

    /// Build a runtime from already loaded configuration.
    ///
    /// With a `database` setting the SQLite file is opened (and its parent
    /// directory created); without one everything lives in memory.
    pub fn from_config(root: &Path, config: AppConfig) -> RuntimeResult<Self> {
        let store: Arc<dyn ProcessStore> = match config.database_path(root) {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        RuntimeError::DirectoryCreate {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
                info!("Opening process database at {}", path.display());
                Arc::new(SqliteStore::open(&path)?)
            }
            None => {
                warn!("No database configured; processes will not outlive this session");
                Arc::new(MemoryStore::new())
            }
        };

        let items = Arc::new(ItemCatalog::new(config.items.clone()));
        let manager = ProcessManager::new(store.clone(), items.clone())
            .with_stats_window(config.global.stats_window);

        Ok(Self {
            root: root.to_path_buf(),
            config,
            store,
            items,
            manager,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    pub fn store(&self) -> Arc<dyn ProcessStore> {
        self.store.clone()
    }

    pub fn manager(&self) -> &ProcessManager {
        &self.manager
    }

    /// A fresh executor over the shared store.
    pub fn executor(&self, sink: Option<Arc<dyn ContentSink>>) -> ProcessExecutor {
        ProcessExecutor::with_event_capacity(
            self.store.clone(),
            sink,
            self.config.global.event_capacity,
        )
    }

    /// Create a stored process for every definition in `processes/`.
    ///
    /// Definitions whose name matches an existing process (archived and
    /// inactive ones included) are skipped. The first invalid definition
    /// aborts the import; processes created before it are kept.
    pub async fn import_definitions(&self) -> RuntimeResult<ImportSummary> {
        let mut existing: HashSet<String> = self
            .manager
            .get_all_processes(true, true)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();

        let mut summary = ImportSummary::default();
        for definition in &self.config.processes {
            if existing.contains(&definition.name) {
                info!("Skipping '{}': a process with this name exists", definition.name);
                summary.skipped.push(definition.name.clone());
                continue;
            }

            let process = definition.clone().into_process();
            let id = self.manager.create_process(&process).await?;
            existing.insert(process.name.clone());
            summary.created.push((id, process.name));
        }

        info!(
            "Imported {} processes ({} skipped)",
            summary.created.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }
}
