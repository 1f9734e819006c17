//! Point-in-time copy of the whole inventory collection.

use super::item::InventoryItem;
use serde::Serialize;

/// Every record as of the last fetch, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    items: Vec<InventoryItem>,
}

impl Snapshot {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up a record by exact name.
    pub fn get(&self, name: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.name == name)
    }
}

impl From<Vec<InventoryItem>> for Snapshot {
    fn from(items: Vec<InventoryItem>) -> Self {
        Self::new(items)
    }
}
