//! CRUD, validation and step bookkeeping for processes.

use super::error::{ManagerError, ManagerResult, ValidationError};
use super::stats::ProcessStats;
use super::validation;
use crate::items::ItemProvider;
use crate::store::ProcessStore;
use cf_protocol::{
    NewStep, Process, ProcessId, ProcessStep, ProcessUpdate, StepId, StepUpdate,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of recent execution records summarized by [`ProcessManager::get_process_stats`].
pub const DEFAULT_STATS_WINDOW: usize = 10;

/// Manages the lifecycle of stored processes.
///
/// All writes go through the [`ProcessStore`]. The [`ItemProvider`] is only
/// consulted to take the content snapshot of newly added steps.
pub struct ProcessManager {
    store: Arc<dyn ProcessStore>,
    items: Arc<dyn ItemProvider>,
    stats_window: usize,
}

impl ProcessManager {
    pub fn new(store: Arc<dyn ProcessStore>, items: Arc<dyn ItemProvider>) -> Self {
        info!("ProcessManager initialized");
        Self {
            store,
            items,
            stats_window: DEFAULT_STATS_WINDOW,
        }
    }

    /// Override how many recent runs the statistics consider.
    pub fn with_stats_window(mut self, window: usize) -> Self {
        self.stats_window = window;
        self
    }

    /// Validate and persist a new process together with its steps.
    ///
    /// Every step's item is resolved through the item provider and its
    /// snapshot copied into the step before anything is written.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Validation`] if a scalar field is invalid
    /// - [`ManagerError::ItemNotFound`] if a step references an unknown item
    pub async fn create_process(&self, process: &Process) -> ManagerResult<ProcessId> {
        self.validate_process(process)?;

        let mut resolved = process.clone();
        for step in &mut resolved.steps {
            self.snapshot_step(step).await?;
        }

        let id = self.store.add_process(&resolved).await?;
        info!(
            "Process created: {} (ID: {}) with {} steps",
            resolved.name,
            id,
            resolved.steps.len()
        );
        Ok(id)
    }

    pub async fn get_process(&self, id: ProcessId) -> ManagerResult<Option<Process>> {
        let process = self.store.get_process(id).await?;
        match &process {
            Some(p) => debug!("Retrieved process {}: {} with {} steps", id, p.name, p.steps.len()),
            None => warn!("Process {} not found", id),
        }
        Ok(process)
    }

    pub async fn get_all_processes(
        &self,
        include_archived: bool,
        include_inactive: bool,
    ) -> ManagerResult<Vec<Process>> {
        let processes = self
            .store
            .get_all_processes(include_archived, include_inactive)
            .await?;
        info!("Retrieved {} processes", processes.len());
        Ok(processes)
    }

    /// Re-validate and write back the editable scalar fields of `process`.
    ///
    /// Steps are managed separately through the step operations.
    pub async fn update_process(&self, process: &Process) -> ManagerResult<()> {
        let id = process.id.ok_or(ManagerError::MissingId)?;
        self.validate_process(process)?;

        self.store
            .update_process(id, &ProcessUpdate::from_process(process))
            .await?;
        info!("Process {} updated: {}", id, process.name);
        Ok(())
    }

    /// Delete a process. Its steps and history go with it.
    pub async fn delete_process(&self, id: ProcessId) -> ManagerResult<()> {
        let process = self
            .store
            .get_process(id)
            .await?
            .ok_or(ManagerError::NotFound(id))?;

        self.store.delete_process(id).await?;
        info!("Process {} deleted: {}", id, process.name);
        Ok(())
    }

    /// Append (or insert at an explicit position) a step referencing an item.
    ///
    /// Without an explicit `step_order` the step goes after the current last
    /// step. An explicit position shifts the steps at and after it down by
    /// one; positions past the end append. Orders stay `1..=N` either way.
    pub async fn add_step(&self, process_id: ProcessId, new_step: NewStep) -> ManagerResult<StepId> {
        let existing = self
            .store
            .get_process(process_id)
            .await?
            .ok_or(ManagerError::NotFound(process_id))?;

        let len = existing.steps.len() as u32;
        let step_order = new_step
            .step_order
            .map_or(len + 1, |n| n.clamp(1, len + 1));

        let mut step = ProcessStep {
            step_order,
            custom_label: new_step.custom_label,
            is_optional: new_step.is_optional,
            wait_for_confirmation: new_step.wait_for_confirmation,
            notes: new_step.notes,
            ..ProcessStep::new(new_step.item_id)
        };
        self.snapshot_step(&mut step).await?;

        let step_id = self.store.add_step(process_id, &step).await?;
        if step_order <= len {
            let mut order: Vec<StepId> = existing.steps.iter().filter_map(|s| s.id).collect();
            order.insert(step_order as usize - 1, step_id);
            self.store.reorder_steps(process_id, &order).await?;
        }
        info!("Step added to process {} at order {}", process_id, step_order);
        Ok(step_id)
    }

    /// Remove a step and renumber the remaining steps to `1..M`.
    pub async fn remove_step(&self, process_id: ProcessId, step_id: StepId) -> ManagerResult<()> {
        let steps = self.store.get_steps(process_id).await?;
        if !steps.iter().any(|s| s.id == Some(step_id)) {
            return Err(ManagerError::StepNotFound(step_id));
        }

        self.store.delete_step(step_id).await?;

        let remaining: Vec<StepId> = steps
            .iter()
            .filter_map(|s| s.id)
            .filter(|id| *id != step_id)
            .collect();
        if !remaining.is_empty() {
            self.store.reorder_steps(process_id, &remaining).await?;
        }

        info!("Step {} removed from process {}", step_id, process_id);
        Ok(())
    }

    /// Assign `step_order = position + 1` following `step_ids`.
    ///
    /// # Errors
    ///
    /// [`ManagerError::InvalidStepOrder`] unless `step_ids` names every step
    /// of the process exactly once. Nothing is changed in that case.
    pub async fn reorder_steps(
        &self,
        process_id: ProcessId,
        step_ids: &[StepId],
    ) -> ManagerResult<()> {
        self.store.reorder_steps(process_id, step_ids).await?;
        info!("Reordered {} steps for process {}", step_ids.len(), process_id);
        Ok(())
    }

    pub async fn update_step(&self, step_id: StepId, update: &StepUpdate) -> ManagerResult<()> {
        self.store.update_step(step_id, update).await?;
        info!("Step {} updated", step_id);
        Ok(())
    }

    /// Case-insensitive search over name, description and tags.
    pub async fn search_processes(&self, query: &str) -> ManagerResult<Vec<Process>> {
        let processes = self.store.search_processes(query).await?;
        info!("Search '{}' found {} processes", query, processes.len());
        Ok(processes)
    }

    pub async fn get_pinned_processes(&self) -> ManagerResult<Vec<Process>> {
        let processes = self.store.get_pinned_processes().await?;
        info!("Retrieved {} pinned processes", processes.len());
        Ok(processes)
    }

    pub fn validate_process(&self, process: &Process) -> Result<(), ValidationError> {
        validation::validate_process(process).inspect_err(|e| {
            debug!("Validation failed for '{}': {}", process.name, e);
        })
    }

    /// Record one use of the process: bump `use_count` and stamp `last_used`.
    pub async fn increment_use_count(&self, process_id: ProcessId) -> ManagerResult<()> {
        let process = self
            .store
            .get_process(process_id)
            .await?
            .ok_or(ManagerError::NotFound(process_id))?;

        let update = ProcessUpdate::usage(process.use_count.saturating_add(1), Utc::now());
        self.store.update_process(process_id, &update).await?;
        debug!("Incremented use count for process {}", process_id);
        Ok(())
    }

    /// Summary of the process and its most recent runs.
    ///
    /// Returns `Ok(None)` for an unknown process.
    pub async fn get_process_stats(&self, process_id: ProcessId) -> ManagerResult<Option<ProcessStats>> {
        let Some(process) = self.store.get_process(process_id).await? else {
            return Ok(None);
        };
        let history = self
            .store
            .get_process_execution_history(process_id, self.stats_window)
            .await?;
        Ok(Some(ProcessStats::from_history(process_id, &process, &history)))
    }

    async fn snapshot_step(&self, step: &mut ProcessStep) -> ManagerResult<()> {
        let item = self
            .items
            .get(step.item_id)
            .await
            .ok_or(ManagerError::ItemNotFound(step.item_id))?;
        step.apply_snapshot(&item);
        Ok(())
    }
}
