//! Process definition files for `.clipflow/processes/*.yaml`.
//!
//! Definitions are the hand-written, importable form of a [`Process`]. Steps
//! reference items by id; the item snapshot is filled in on import.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::process_models::{ItemId, Process, ProcessStep};

/// A single step in a process definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct StepDefinition {
    /// Id of the item whose content this step delivers.
    pub item: ItemId,

    /// Overrides the item label in progress output.
    #[serde(default)]
    pub label: Option<String>,

    /// A failing optional step does not abort the run.
    #[serde(default)]
    pub optional: bool,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub wait_for_confirmation: bool,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub group: Option<String>,
}

/// An importable process definition.
///
/// # Example
///
/// ```yaml
/// name: morning-login
/// description: Paste credentials into the VPN client
/// delay-between-steps: 800
/// tags: [vpn, daily]
/// steps:
///   - item: 1
///   - item: 2
///     label: Password
///   - item: 3
///     optional: true
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessDefinition {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default = "default_execution_mode")]
    pub execution_mode: String,

    #[serde(default = "default_delay")]
    pub delay_between_steps: i64,

    #[serde(default)]
    pub pinned: bool,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub category: Option<String>,

    pub steps: Vec<StepDefinition>,
}

fn default_true() -> bool {
    true
}

fn default_execution_mode() -> String {
    "sequential".to_string()
}

fn default_delay() -> i64 {
    500
}

impl ProcessDefinition {
    /// Build an unsaved [`Process`] with steps numbered in file order.
    ///
    /// Item snapshots are left empty.
    pub fn into_process(self) -> Process {
        let mut process = Process::new(self.name);
        process.description = self.description;
        if let Some(icon) = self.icon {
            process.icon = icon;
        }
        process.color = self.color;
        process.execution_mode = self.execution_mode.into();
        process.delay_between_steps = self.delay_between_steps;
        process.is_pinned = self.pinned;
        process.tags = self.tags;
        process.category = self.category;

        for step in self.steps {
            process.add_step(ProcessStep {
                custom_label: step.label,
                is_optional: step.optional,
                is_enabled: step.enabled,
                wait_for_confirmation: step.wait_for_confirmation,
                notes: step.notes,
                group_name: step.group,
                ..ProcessStep::new(step.item)
            });
        }
        process
    }
}
