//! In-memory [`ProcessStore`].

use super::{is_permutation, listing_order, matches_query, ProcessStore, StoreError, StoreResult};
use async_trait::async_trait;
use cf_protocol::{
    ExecutionId, ExecutionRecord, ExecutionStatus, ExecutionUpdate, Process, ProcessId,
    ProcessStep, ProcessUpdate, StepId, StepUpdate,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    last_process_id: ProcessId,
    last_step_id: StepId,
    last_execution_id: ExecutionId,
    /// Process rows, stored without their steps.
    processes: BTreeMap<ProcessId, Process>,
    steps: BTreeMap<StepId, ProcessStep>,
    history: BTreeMap<ExecutionId, ExecutionRecord>,
}

impl MemoryState {
    fn steps_of(&self, process_id: ProcessId) -> Vec<ProcessStep> {
        let mut steps: Vec<ProcessStep> = self
            .steps
            .values()
            .filter(|s| s.process_id == Some(process_id))
            .cloned()
            .collect();
        steps.sort_by_key(|s| (s.step_order, s.id));
        steps
    }

    fn assemble(&self, row: &Process) -> Process {
        let mut process = row.clone();
        if let Some(id) = row.id {
            process.steps = self.steps_of(id);
        }
        process
    }

    fn insert_step(&mut self, process_id: ProcessId, step: &ProcessStep) -> StepId {
        self.last_step_id += 1;
        let id = self.last_step_id;
        let mut stored = step.clone();
        stored.id = Some(id);
        stored.process_id = Some(process_id);
        stored.added_at = Some(Utc::now());
        self.steps.insert(id, stored);
        id
    }
}

/// A [`ProcessStore`] that keeps everything in process memory.
///
/// Ids are assigned sequentially starting at 1, like SQLite rowids.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut state)
    }
}

#[async_trait]
impl ProcessStore for MemoryStore {
    async fn add_process(&self, process: &Process) -> StoreResult<ProcessId> {
        self.with_state(|state| {
            state.last_process_id += 1;
            let id = state.last_process_id;

            let mut row = process.clone();
            row.id = Some(id);
            row.steps = Vec::new();
            row.created_at = Some(Utc::now());
            row.updated_at = row.created_at;
            state.processes.insert(id, row);

            for step in &process.steps {
                state.insert_step(id, step);
            }
            Ok(id)
        })
    }

    async fn get_process(&self, id: ProcessId) -> StoreResult<Option<Process>> {
        self.with_state(|state| Ok(state.processes.get(&id).map(|row| state.assemble(row))))
    }

    async fn get_all_processes(
        &self,
        include_archived: bool,
        include_inactive: bool,
    ) -> StoreResult<Vec<Process>> {
        self.with_state(|state| {
            let mut processes: Vec<Process> = state
                .processes
                .values()
                .filter(|p| include_archived || !p.is_archived)
                .filter(|p| include_inactive || p.is_active)
                .map(|row| state.assemble(row))
                .collect();
            processes.sort_by(listing_order);
            Ok(processes)
        })
    }

    async fn update_process(&self, id: ProcessId, update: &ProcessUpdate) -> StoreResult<()> {
        self.with_state(|state| {
            let row = state
                .processes
                .get_mut(&id)
                .ok_or(StoreError::ProcessNotFound(id))?;
            update.apply_to(row);
            row.updated_at = Some(Utc::now());
            Ok(())
        })
    }

    async fn delete_process(&self, id: ProcessId) -> StoreResult<()> {
        self.with_state(|state| {
            if state.processes.remove(&id).is_none() {
                return Err(StoreError::ProcessNotFound(id));
            }
            state.steps.retain(|_, s| s.process_id != Some(id));
            state.history.retain(|_, r| r.process_id != id);
            Ok(())
        })
    }

    async fn search_processes(&self, query: &str) -> StoreResult<Vec<Process>> {
        self.with_state(|state| {
            let mut processes: Vec<Process> = state
                .processes
                .values()
                .filter(|p| p.is_active && !p.is_archived)
                .filter(|p| matches_query(p, query))
                .map(|row| state.assemble(row))
                .collect();
            processes.sort_by(|a, b| b.use_count.cmp(&a.use_count).then_with(|| a.name.cmp(&b.name)));
            Ok(processes)
        })
    }

    async fn get_pinned_processes(&self) -> StoreResult<Vec<Process>> {
        self.with_state(|state| {
            let mut processes: Vec<Process> = state
                .processes
                .values()
                .filter(|p| p.is_pinned && p.is_active && !p.is_archived)
                .map(|row| state.assemble(row))
                .collect();
            processes.sort_by_key(|p| p.pinned_order);
            Ok(processes)
        })
    }

    async fn add_step(&self, process_id: ProcessId, step: &ProcessStep) -> StoreResult<StepId> {
        self.with_state(|state| {
            if !state.processes.contains_key(&process_id) {
                return Err(StoreError::ProcessNotFound(process_id));
            }
            Ok(state.insert_step(process_id, step))
        })
    }

    async fn get_steps(&self, process_id: ProcessId) -> StoreResult<Vec<ProcessStep>> {
        self.with_state(|state| Ok(state.steps_of(process_id)))
    }

    async fn update_step(&self, step_id: StepId, update: &StepUpdate) -> StoreResult<()> {
        self.with_state(|state| {
            let step = state
                .steps
                .get_mut(&step_id)
                .ok_or(StoreError::StepNotFound(step_id))?;
            update.apply_to(step);
            Ok(())
        })
    }

    async fn delete_step(&self, step_id: StepId) -> StoreResult<()> {
        self.with_state(|state| {
            state
                .steps
                .remove(&step_id)
                .map(|_| ())
                .ok_or(StoreError::StepNotFound(step_id))
        })
    }

    async fn reorder_steps(&self, process_id: ProcessId, step_ids: &[StepId]) -> StoreResult<()> {
        self.with_state(|state| {
            let current: Vec<StepId> = state
                .steps
                .values()
                .filter(|s| s.process_id == Some(process_id))
                .filter_map(|s| s.id)
                .collect();
            if !is_permutation(&current, step_ids) {
                return Err(StoreError::InvalidStepOrder(process_id));
            }
            for (position, step_id) in step_ids.iter().enumerate() {
                if let Some(step) = state.steps.get_mut(step_id) {
                    step.step_order = position as u32 + 1;
                }
            }
            Ok(())
        })
    }

    async fn add_execution_history(
        &self,
        process_id: ProcessId,
        total_steps: u32,
    ) -> StoreResult<ExecutionId> {
        self.with_state(|state| {
            if !state.processes.contains_key(&process_id) {
                return Err(StoreError::ProcessNotFound(process_id));
            }
            state.last_execution_id += 1;
            let id = state.last_execution_id;
            state.history.insert(
                id,
                ExecutionRecord {
                    id,
                    process_id,
                    status: ExecutionStatus::Running,
                    total_steps,
                    completed_steps: 0,
                    failed_steps: 0,
                    started_at: Utc::now(),
                    completed_at: None,
                    duration_ms: None,
                    error_message: None,
                },
            );
            Ok(id)
        })
    }

    async fn update_execution_history(
        &self,
        id: ExecutionId,
        update: &ExecutionUpdate,
    ) -> StoreResult<()> {
        self.with_state(|state| {
            let record = state
                .history
                .get_mut(&id)
                .ok_or(StoreError::ExecutionNotFound(id))?;
            if record.status.is_terminal() {
                return Err(StoreError::ExecutionFinalized(id));
            }
            record.status = update.status;
            record.completed_steps = update.completed_steps;
            record.failed_steps = update.failed_steps;
            record.duration_ms = Some(update.duration_ms);
            record.error_message = update.error_message.clone();
            if update.status.is_terminal() {
                record.completed_at = Some(Utc::now());
            }
            Ok(())
        })
    }

    async fn get_process_execution_history(
        &self,
        process_id: ProcessId,
        limit: usize,
    ) -> StoreResult<Vec<ExecutionRecord>> {
        self.with_state(|state| {
            let mut records: Vec<ExecutionRecord> = state
                .history
                .values()
                .filter(|r| r.process_id == process_id)
                .cloned()
                .collect();
            records.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
            records.truncate(limit);
            Ok(records)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process_with_steps(name: &str, count: u32) -> Process {
        let mut process = Process::new(name);
        for i in 1..=count {
            process.add_step(ProcessStep {
                item_label: format!("step {i}"),
                ..ProcessStep::new(i64::from(i))
            });
        }
        process
    }

    #[tokio::test]
    async fn test_add_and_get_process() {
        let store = MemoryStore::new();
        let id = store.add_process(&process_with_steps("p", 3)).await.unwrap();

        let process = store.get_process(id).await.unwrap().unwrap();
        assert_eq!(process.id, Some(id));
        assert_eq!(process.steps.len(), 3);
        assert!(process.created_at.is_some());
        assert!(process.steps.iter().all(|s| s.process_id == Some(id) && s.id.is_some()));

        assert!(store.get_process(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = MemoryStore::new();
        let id = store.add_process(&process_with_steps("p", 2)).await.unwrap();
        store.add_execution_history(id, 2).await.unwrap();

        store.delete_process(id).await.unwrap();
        assert!(store.get_steps(id).await.unwrap().is_empty());
        assert!(store
            .get_process_execution_history(id, 10)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            store.delete_process(id).await,
            Err(StoreError::ProcessNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reorder_rejects_foreign_and_repeated_steps() {
        let store = MemoryStore::new();
        let a = store.add_process(&process_with_steps("a", 2)).await.unwrap();
        let b = store.add_process(&process_with_steps("b", 1)).await.unwrap();
        let a_steps = store.get_steps(a).await.unwrap();
        let b_steps = store.get_steps(b).await.unwrap();
        let (a1, a2) = (a_steps[0].id.unwrap(), a_steps[1].id.unwrap());
        let b1 = b_steps[0].id.unwrap();

        for ids in [vec![a2, b1, a1], vec![a2, a2], vec![a2]] {
            assert!(matches!(
                store.reorder_steps(a, &ids).await,
                Err(StoreError::InvalidStepOrder(id)) if id == a
            ));
        }

        let orders: Vec<u32> = store
            .get_steps(a)
            .await
            .unwrap()
            .iter()
            .map(|s| s.step_order)
            .collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(store.get_steps(b).await.unwrap()[0].step_order, 1);

        store.reorder_steps(a, &[a2, a1]).await.unwrap();
        assert_eq!(store.get_steps(a).await.unwrap()[0].id, Some(a2));
    }

    #[tokio::test]
    async fn test_execution_history_is_finalized_once() {
        let store = MemoryStore::new();
        let id = store.add_process(&process_with_steps("p", 1)).await.unwrap();
        let exec = store.add_execution_history(id, 1).await.unwrap();

        let update = ExecutionUpdate {
            status: ExecutionStatus::Completed,
            completed_steps: 1,
            failed_steps: 0,
            duration_ms: 12,
            error_message: None,
        };
        store.update_execution_history(exec, &update).await.unwrap();
        assert!(matches!(
            store.update_execution_history(exec, &update).await,
            Err(StoreError::ExecutionFinalized(_))
        ));

        let history = store.get_process_execution_history(id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Completed);
        assert!(history[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn test_history_newest_first_with_limit() {
        let store = MemoryStore::new();
        let id = store.add_process(&process_with_steps("p", 1)).await.unwrap();
        for _ in 0..5 {
            store.add_execution_history(id, 1).await.unwrap();
        }
        let history = store.get_process_execution_history(id, 3).await.unwrap();
        let ids: Vec<ExecutionId> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn test_search_and_pinned_filters() {
        let store = MemoryStore::new();
        let mut archived = Process::new("Deploy old");
        archived.is_archived = true;
        store.add_process(&archived).await.unwrap();

        let mut pinned = Process::new("Deploy new");
        pinned.is_pinned = true;
        pinned.use_count = 3;
        store.add_process(&pinned).await.unwrap();

        let mut other = Process::new("Another deploy");
        other.use_count = 1;
        store.add_process(&other).await.unwrap();

        let found = store.search_processes("DEPLOY").await.unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Deploy new", "Another deploy"]);

        let pinned_list = store.get_pinned_processes().await.unwrap();
        assert_eq!(pinned_list.len(), 1);
        assert_eq!(pinned_list[0].name, "Deploy new");

        assert_eq!(store.get_all_processes(false, false).await.unwrap().len(), 2);
        assert_eq!(store.get_all_processes(true, false).await.unwrap().len(), 3);
    }
}
