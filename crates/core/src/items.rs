//! Item provider: the source of the content that steps deliver.

use async_trait::async_trait;
use cf_protocol::{Item, ItemId};
use std::collections::HashMap;

/// Looks up stored content items by id.
///
/// Only consulted when a step's snapshot is taken; a running process never
/// calls back into the provider.
#[async_trait]
pub trait ItemProvider: Send + Sync {
    async fn get(&self, id: ItemId) -> Option<Item>;
}

/// An in-memory item provider, typically loaded from `.clipflow/items/`.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemId, Item>,
}

impl ItemCatalog {
    /// Build a catalog from a list of items. Later duplicates replace earlier ones.
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    pub fn insert(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.id, item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items sorted by id.
    pub fn list(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by_key(|item| item.id);
        items
    }
}

#[async_trait]
impl ItemProvider for ItemCatalog {
    async fn get(&self, id: ItemId) -> Option<Item> {
        self.items.get(&id).cloned()
    }
}
