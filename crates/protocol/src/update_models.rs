//! Partial-update payloads for processes and steps.
//!
//! Every field is optional; `None` leaves the stored value alone. Nullable
//! columns use `Option<Option<T>>` so callers can clear them explicitly.

use chrono::{DateTime, Utc};

use crate::process_models::{ExecutionMode, ItemId, Process, ProcessStep};

/// Fields of a process that may be changed after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<String>,
    pub color: Option<Option<String>>,
    pub execution_mode: Option<ExecutionMode>,
    pub delay_between_steps: Option<i64>,
    pub auto_copy_results: Option<bool>,
    pub is_pinned: Option<bool>,
    pub pinned_order: Option<i64>,
    pub is_active: Option<bool>,
    pub is_archived: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Option<String>>,
    pub use_count: Option<u32>,
    pub last_used: Option<DateTime<Utc>>,
}

impl ProcessUpdate {
    /// Every user-editable scalar field of `process`.
    ///
    /// Usage statistics are left untouched.
    pub fn from_process(process: &Process) -> Self {
        Self {
            name: Some(process.name.clone()),
            description: Some(process.description.clone()),
            icon: Some(process.icon.clone()),
            color: Some(process.color.clone()),
            execution_mode: Some(process.execution_mode.clone()),
            delay_between_steps: Some(process.delay_between_steps),
            auto_copy_results: Some(process.auto_copy_results),
            is_pinned: Some(process.is_pinned),
            pinned_order: Some(process.pinned_order),
            is_active: Some(process.is_active),
            is_archived: Some(process.is_archived),
            tags: Some(process.tags.clone()),
            category: Some(process.category.clone()),
            use_count: None,
            last_used: None,
        }
    }

    /// Record one more use of the process at `at`.
    pub fn usage(use_count: u32, at: DateTime<Utc>) -> Self {
        Self {
            use_count: Some(use_count),
            last_used: Some(at),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields to `process`.
    pub fn apply_to(&self, process: &mut Process) {
        if let Some(name) = &self.name {
            process.name = name.clone();
        }
        if let Some(description) = &self.description {
            process.description = description.clone();
        }
        if let Some(icon) = &self.icon {
            process.icon = icon.clone();
        }
        if let Some(color) = &self.color {
            process.color = color.clone();
        }
        if let Some(mode) = &self.execution_mode {
            process.execution_mode = mode.clone();
        }
        if let Some(delay) = self.delay_between_steps {
            process.delay_between_steps = delay;
        }
        if let Some(auto_copy) = self.auto_copy_results {
            process.auto_copy_results = auto_copy;
        }
        if let Some(pinned) = self.is_pinned {
            process.is_pinned = pinned;
        }
        if let Some(order) = self.pinned_order {
            process.pinned_order = order;
        }
        if let Some(active) = self.is_active {
            process.is_active = active;
        }
        if let Some(archived) = self.is_archived {
            process.is_archived = archived;
        }
        if let Some(tags) = &self.tags {
            process.tags = tags.clone();
        }
        if let Some(category) = &self.category {
            process.category = category.clone();
        }
        if let Some(count) = self.use_count {
            process.use_count = count;
        }
        if let Some(at) = self.last_used {
            process.last_used = Some(at);
        }
    }
}

/// Fields of a step that may be changed after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepUpdate {
    pub step_order: Option<u32>,
    pub custom_label: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub is_optional: Option<bool>,
    pub is_enabled: Option<bool>,
    pub wait_for_confirmation: Option<bool>,
    pub group_name: Option<Option<String>>,
    pub group_order: Option<i64>,
}

impl StepUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, step: &mut ProcessStep) {
        if let Some(order) = self.step_order {
            step.step_order = order;
        }
        if let Some(label) = &self.custom_label {
            step.custom_label = label.clone();
        }
        if let Some(notes) = &self.notes {
            step.notes = notes.clone();
        }
        if let Some(optional) = self.is_optional {
            step.is_optional = optional;
        }
        if let Some(enabled) = self.is_enabled {
            step.is_enabled = enabled;
        }
        if let Some(confirm) = self.wait_for_confirmation {
            step.wait_for_confirmation = confirm;
        }
        if let Some(group) = &self.group_name {
            step.group_name = group.clone();
        }
        if let Some(order) = self.group_order {
            step.group_order = order;
        }
    }
}

/// A step to append to an existing process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewStep {
    pub item_id: ItemId,
    /// Appended at the end when `None`.
    pub step_order: Option<u32>,
    pub custom_label: Option<String>,
    pub is_optional: bool,
    pub wait_for_confirmation: bool,
    pub notes: Option<String>,
}

impl NewStep {
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            ..Self::default()
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn at(mut self, step_order: u32) -> Self {
        self.step_order = Some(step_order);
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.custom_label = Some(label.into());
        self
    }
}
