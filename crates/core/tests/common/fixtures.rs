//! Test fixtures for creating sample projects and wired collaborators.

use cf_core::engine::ProcessExecutor;
use cf_core::items::ItemCatalog;
use cf_core::manager::ProcessManager;
use cf_core::sink::ContentSink;
use cf_core::store::{MemoryStore, ProcessStore};
use cf_protocol::{Item, ItemId, Process, ProcessId, ProcessStep};
use std::sync::Arc;
use tempfile::TempDir;

/// Manager and executor over one shared in-memory store.
#[allow(dead_code)]
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub manager: ProcessManager,
    pub executor: Arc<ProcessExecutor>,
}

/// Items 1..=n whose content is `"content-{id}"`.
#[allow(dead_code)]
pub fn numbered_catalog(n: ItemId) -> ItemCatalog {
    ItemCatalog::new(
        (1..=n)
            .map(|id| Item::new(id, format!("Item {id}"), format!("content-{id}")))
            .collect(),
    )
}

#[allow(dead_code)]
pub fn harness(catalog: ItemCatalog, sink: Arc<dyn ContentSink>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn ProcessStore> = store.clone();
    Harness {
        manager: ProcessManager::new(dyn_store.clone(), Arc::new(catalog)),
        executor: Arc::new(ProcessExecutor::new(dyn_store, Some(sink))),
        store,
    }
}

/// An unsaved process with one step per item id, no delay.
#[allow(dead_code)]
pub fn process_of(name: &str, item_ids: &[ItemId]) -> Process {
    let mut process = Process::new(name);
    process.delay_between_steps = 0;
    for id in item_ids {
        process.add_step(ProcessStep::new(*id));
    }
    process
}

impl Harness {
    /// Create `process` through the manager and read it back.
    #[allow(dead_code)]
    pub async fn saved(&self, process: &Process) -> (ProcessId, Process) {
        let id = self
            .manager
            .create_process(process)
            .await
            .expect("Failed to create process");
        let stored = self
            .manager
            .get_process(id)
            .await
            .expect("Failed to read process")
            .expect("Process should exist");
        (id, stored)
    }
}

/// Create a temporary project directory with `.clipflow` configuration.
///
/// Contains three items (one sensitive) and two process definitions.
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project(database: bool) -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let cf_dir = temp_dir.path().join(".clipflow");

    std::fs::create_dir_all(cf_dir.join("items"))?;
    std::fs::create_dir_all(cf_dir.join("processes"))?;

    if database {
        std::fs::write(cf_dir.join("config.toml"), "database = \"data/test.db\"\n")?;
    }

    std::fs::write(
        cf_dir.join("items/user.md"),
        "---\nid: 1\nlabel: User\n---\n\nbob\n",
    )?;
    std::fs::write(
        cf_dir.join("items/secret.md"),
        "---\nid: 2\nlabel: Secret\nsensitive: true\n---\n\ns3cret\n",
    )?;
    std::fs::write(
        cf_dir.join("items/url.md"),
        "---\nid: 3\nlabel: Console\ntype: URL\n---\n\nhttps://console.example.com\n",
    )?;

    let signin = r#"name: sign-in
delay-between-steps: 0
tags: [auth]
steps:
  - item: 1
  - item: 2
"#;
    let console = r#"name: console
delay-between-steps: 0
pinned: true
steps:
  - item: 3
  - item: 1
    enabled: false
  - item: 2
    optional: true
"#;
    std::fs::write(cf_dir.join("processes/sign-in.yaml"), signin)?;
    std::fs::write(cf_dir.join("processes/console.yaml"), console)?;

    Ok(temp_dir)
}
