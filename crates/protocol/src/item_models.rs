//! Content item models for `.clipflow/items/*.md`.
//!
//! Items are the stored payloads that process steps deliver. They live
//! outside the process engine; a step only keeps a snapshot of one.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::process_models::ItemId;

/// A stored content item.
///
/// Items can be defined as Markdown files whose YAML front matter holds the
/// metadata and whose body is the content to deliver.
///
/// # Example
///
/// ```markdown
/// ---
/// id: 3
/// label: Staging URL
/// type: URL
/// icon: "🌐"
/// ---
/// https://staging.example.com
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct Item {
    pub id: ItemId,

    pub label: String,

    /// Free-form content kind (`TEXT`, `URL`, `CODE`, ...).
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,

    #[serde(default)]
    pub icon: Option<String>,

    /// Sensitive items are never echoed by the CLI.
    #[serde(rename = "sensitive", default)]
    pub is_sensitive: bool,

    /// The payload. Taken from the Markdown body, not the front matter.
    #[serde(skip)]
    pub content: String,
}

fn default_item_type() -> String {
    "TEXT".to_string()
}

impl Item {
    pub fn new(id: ItemId, label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            item_type: default_item_type(),
            icon: None,
            is_sensitive: false,
            content: content.into(),
        }
    }
}
