//! End-to-end tests over a `.clipflow/` project backed by SQLite.
//!
//! Loads configuration from disk, imports definitions, runs processes and
//! reads statistics back after reopening the database.

mod common;

use cf_core::manager::ManagerError;
use cf_core::runtime::Runtime;
use cf_core::sink::MockSink;
use cf_protocol::{ExecutionStatus, NewStep};
use common::*;
use std::sync::Arc;

#[tokio::test]
async fn test_import_run_and_reopen() {
    let project = create_test_project(true).expect("Failed to create test project");

    let console_id = {
        let runtime = Runtime::load(project.path()).await.unwrap();
        let summary = runtime.import_definitions().await.unwrap();
        assert_eq!(summary.created.len(), 2);

        let (console_id, _) = summary
            .created
            .iter()
            .find(|(_, name)| name == "console")
            .cloned()
            .unwrap();

        let sink = Arc::new(MockSink::new());
        let executor = runtime.executor(Some(sink.clone()));
        let process = runtime
            .manager()
            .get_process(console_id)
            .await
            .unwrap()
            .unwrap();

        let report = executor.execute_process(&process).await.unwrap();
        assert!(report.success());
        // Disabled step 2 is skipped.
        assert_eq!(
            sink.delivered(),
            vec!["https://console.example.com", "s3cret"]
        );
        console_id
    };

    assert!(project.path().join(".clipflow/data/test.db").exists());

    let runtime = Runtime::load(project.path()).await.unwrap();
    let stats = runtime
        .manager()
        .get_process_stats(console_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats.name, "console");
    assert_eq!(stats.total_steps, 3);
    assert_eq!(stats.enabled_steps, 2);
    assert_eq!(stats.optional_steps, 1);
    assert_eq!(stats.use_count, 1);
    assert_eq!(stats.total_executions, 1);
    assert_eq!(stats.success_rate, 100.0);
    assert!(stats.is_pinned);

    let executor = runtime.executor(None);
    let last = executor.get_last_execution_status(console_id).await.unwrap();
    assert_eq!(last.status, ExecutionStatus::Completed);
    assert_eq!(last.total_steps, 2);
}

#[tokio::test]
async fn test_step_editing_persists() {
    let project = create_test_project(true).expect("Failed to create test project");
    let runtime = Runtime::load(project.path()).await.unwrap();
    runtime.import_definitions().await.unwrap();

    let manager = runtime.manager();
    let found = manager.search_processes("AUTH").await.unwrap();
    assert_eq!(found.len(), 1);
    let id = found[0].id.unwrap();

    let step_id = manager
        .add_step(id, NewStep::new(3).labeled("Open console"))
        .await
        .unwrap();

    let process = manager.get_process(id).await.unwrap().unwrap();
    let ids: Vec<_> = process.steps.iter().filter_map(|s| s.id).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[2], step_id);

    manager
        .reorder_steps(id, &[step_id, ids[0], ids[1]])
        .await
        .unwrap();
    manager.remove_step(id, ids[1]).await.unwrap();

    let process = manager.get_process(id).await.unwrap().unwrap();
    let labels: Vec<&str> = process.steps.iter().map(|s| s.display_label()).collect();
    assert_eq!(labels, vec!["Open console", "User"]);
    let orders: Vec<u32> = process.steps.iter().map(|s| s.step_order).collect();
    assert_eq!(orders, vec![1, 2]);
}

#[tokio::test]
async fn test_delete_removes_history() {
    let project = create_test_project(true).expect("Failed to create test project");
    let runtime = Runtime::load(project.path()).await.unwrap();
    let summary = runtime.import_definitions().await.unwrap();
    let (id, _) = summary.created[0].clone();

    let executor = runtime.executor(Some(Arc::new(MockSink::new())));
    let process = runtime.manager().get_process(id).await.unwrap().unwrap();
    executor.execute_process(&process).await.unwrap();
    assert_eq!(executor.get_execution_history(id, 10).await.len(), 1);

    runtime.manager().delete_process(id).await.unwrap();

    assert!(runtime.manager().get_process(id).await.unwrap().is_none());
    assert!(executor.get_execution_history(id, 10).await.is_empty());
    assert!(matches!(
        runtime.manager().delete_process(id).await,
        Err(ManagerError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_in_memory_project_forgets_processes() {
    let project = create_test_project(false).expect("Failed to create test project");
    {
        let runtime = Runtime::load(project.path()).await.unwrap();
        assert_eq!(runtime.items().len(), 3);
        runtime.import_definitions().await.unwrap();
    }

    let runtime = Runtime::load(project.path()).await.unwrap();
    let all = runtime.manager().get_all_processes(true, true).await.unwrap();
    assert!(all.is_empty());
}
