//! Process definition models.
//!
//! A [`Process`] is a named, ordered sequence of [`ProcessStep`]s. Each step
//! references a stored item and carries a denormalized snapshot of it, so a
//! run never has to consult the item provider while it is in progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::item_models::Item;

/// Identifier of a persisted process.
pub type ProcessId = i64;

/// Identifier of a persisted process step.
pub type StepId = i64;

/// Identifier of a stored content item.
pub type ItemId = i64;

/// Upper bound on `Process::name`, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Upper bound on `Process::delay_between_steps`, in milliseconds.
pub const MAX_DELAY_MS: i64 = 60_000;

/// How the steps of a process are scheduled.
///
/// Only `Sequential` is executed by the engine. Any string that is not one of
/// the known modes deserializes into `Unknown` so that validation can reject
/// it with a readable message instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
    Manual,
    Unknown(String),
}

impl ExecutionMode {
    /// The mode names accepted by validation, in display order.
    pub const ALLOWED: [&'static str; 3] = ["sequential", "parallel", "manual"];

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Manual => "manual",
            ExecutionMode::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ExecutionMode::Unknown(_))
    }
}

impl From<String> for ExecutionMode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "sequential" => ExecutionMode::Sequential,
            "parallel" => ExecutionMode::Parallel,
            "manual" => ExecutionMode::Manual,
            _ => ExecutionMode::Unknown(raw),
        }
    }
}

impl From<&str> for ExecutionMode {
    fn from(raw: &str) -> Self {
        ExecutionMode::from(raw.to_string())
    }
}

impl From<ExecutionMode> for String {
    fn from(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate deciding whether a step runs.
///
/// Reserved for future branching. The only value is `Always`, and the engine
/// treats every step as unconditionally eligible.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum StepCondition {
    #[default]
    Always,
}

impl StepCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            StepCondition::Always => "always",
        }
    }
}

/// One entry in a process's ordered sequence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct ProcessStep {
    pub id: Option<StepId>,
    pub process_id: Option<ProcessId>,
    pub item_id: ItemId,

    /// 1-based position, unique within the owning process.
    ///
    /// Zero means "not yet assigned"; [`Process::add_step`] appends such a step.
    pub step_order: u32,

    // Snapshot of the referenced item.
    pub item_label: String,
    pub item_content: String,
    pub item_type: String,
    pub item_icon: Option<String>,
    pub item_is_sensitive: bool,

    /// Overrides the item label when non-blank.
    pub custom_label: Option<String>,
    pub notes: Option<String>,

    pub is_optional: bool,
    pub is_enabled: bool,

    /// Accepted but auto-confirmed: the engine never suspends on it.
    pub wait_for_confirmation: bool,

    /// UI grouping only; ignored by the engine.
    pub group_name: Option<String>,
    pub group_order: i64,

    pub condition_type: StepCondition,
    pub added_at: Option<DateTime<Utc>>,
}

impl Default for ProcessStep {
    fn default() -> Self {
        Self {
            id: None,
            process_id: None,
            item_id: 0,
            step_order: 0,
            item_label: String::new(),
            item_content: String::new(),
            item_type: "TEXT".to_string(),
            item_icon: None,
            item_is_sensitive: false,
            custom_label: None,
            notes: None,
            is_optional: false,
            is_enabled: true,
            wait_for_confirmation: false,
            group_name: None,
            group_order: 0,
            condition_type: StepCondition::Always,
            added_at: None,
        }
    }
}

impl ProcessStep {
    /// A fresh, enabled, required step referencing `item_id`.
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            ..Self::default()
        }
    }

    /// The label shown for this step: the trimmed custom label when it is
    /// non-blank, otherwise the item's label.
    pub fn display_label(&self) -> &str {
        match self.custom_label.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => custom,
            _ => &self.item_label,
        }
    }

    /// Copy the denormalized item fields from `item` into this step.
    pub fn apply_snapshot(&mut self, item: &Item) {
        self.item_id = item.id;
        self.item_label = item.label.clone();
        self.item_content = item.content.clone();
        self.item_type = item.item_type.clone();
        self.item_icon = item.icon.clone();
        self.item_is_sensitive = item.is_sensitive;
    }
}

/// A named, ordered sequence of steps plus its execution settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct Process {
    pub id: Option<ProcessId>,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: Option<String>,

    pub steps: Vec<ProcessStep>,

    #[ts(type = "string")]
    pub execution_mode: ExecutionMode,

    /// Pause inserted between consecutive steps, in milliseconds.
    pub delay_between_steps: i64,
    pub auto_copy_results: bool,

    pub is_pinned: bool,
    pub pinned_order: i64,
    pub order_index: i64,

    pub use_count: u32,
    pub last_used: Option<DateTime<Utc>>,
    pub access_count: u32,

    pub is_active: bool,
    pub is_archived: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

impl Default for Process {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            icon: "⚙️".to_string(),
            color: None,
            steps: Vec::new(),
            execution_mode: ExecutionMode::Sequential,
            delay_between_steps: 500,
            auto_copy_results: false,
            is_pinned: false,
            pinned_order: 0,
            order_index: 0,
            use_count: 0,
            last_used: None,
            access_count: 0,
            is_active: true,
            is_archived: false,
            created_at: None,
            updated_at: None,
            tags: Vec::new(),
            category: None,
        }
    }
}

impl Process {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Enabled steps in execution order (ascending `step_order`).
    pub fn enabled_steps(&self) -> Vec<&ProcessStep> {
        let mut enabled: Vec<&ProcessStep> = self.steps.iter().filter(|s| s.is_enabled).collect();
        enabled.sort_by_key(|s| s.step_order);
        enabled
    }

    pub fn optional_steps(&self) -> Vec<&ProcessStep> {
        self.steps.iter().filter(|s| s.is_optional).collect()
    }

    pub fn required_steps(&self) -> Vec<&ProcessStep> {
        self.steps.iter().filter(|s| !s.is_optional).collect()
    }

    /// Append a step, assigning it the next position if it has none.
    pub fn add_step(&mut self, mut step: ProcessStep) {
        if step.step_order == 0 {
            step.step_order = self.steps.len() as u32 + 1;
        }
        self.steps.push(step);
    }

    /// Remove the step at `index` and renumber the rest to `1..N`.
    pub fn remove_step(&mut self, index: usize) -> Option<ProcessStep> {
        if index >= self.steps.len() {
            return None;
        }
        let removed = self.steps.remove(index);
        self.renumber_steps();
        Some(removed)
    }

    /// Move the step at `from` to position `to`, renumbering all steps.
    ///
    /// Returns `false` and leaves the process untouched if either index is
    /// out of range.
    pub fn reorder_step(&mut self, from: usize, to: usize) -> bool {
        let len = self.steps.len();
        if from >= len || to >= len {
            return false;
        }
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        self.renumber_steps();
        true
    }

    fn renumber_steps(&mut self) {
        for (position, step) in self.steps.iter_mut().enumerate() {
            step.step_order = position as u32 + 1;
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "'{}' (#{}, {} steps)", self.name, id, self.steps.len()),
            None => write!(f, "'{}' (unsaved, {} steps)", self.name, self.steps.len()),
        }
    }
}
