//! Inventory list view-model.
//!
//! # Responsibility
//! - Own the last snapshot, the current controls and the derived view.
//! - Expose add/remove/clear/search/sort intents for presentation layers.
//!
//! # Invariants
//! - Every intent recomputes the view from the full snapshot using the current
//!   value of all three controls.
//! - A failed store call leaves snapshot and view untouched.

use super::filter::{DateOrder, QuantityOrder, ViewControls};
use crate::model::item::InventoryItem;
use crate::model::snapshot::Snapshot;
use crate::repo::inventory_repo::{InventoryRepository, ItemChange, RepoResult};
use crate::service::inventory_service::InventoryService;
use serde::Serialize;

/// A change to one of the two sort selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortControl {
    Date(DateOrder),
    Quantity(QuantityOrder),
}

/// One rendered list line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    pub name: String,
    pub display_name: String,
    pub quantity: i64,
}

impl From<&InventoryItem> for ItemRow {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            display_name: item.display_name(),
            quantity: item.quantity,
        }
    }
}

/// Per-user list state plus the intents that drive it.
pub struct InventorySession<R: InventoryRepository> {
    service: InventoryService<R>,
    snapshot: Snapshot,
    controls: ViewControls,
    view: Vec<InventoryItem>,
}

impl<R: InventoryRepository> InventorySession<R> {
    /// Opens a session with [`ViewControls::startup`] and fetches once.
    pub fn open(service: InventoryService<R>) -> RepoResult<Self> {
        Self::open_with(service, ViewControls::startup())
    }

    /// Opens a session with explicit controls and fetches once.
    pub fn open_with(service: InventoryService<R>, controls: ViewControls) -> RepoResult<Self> {
        let snapshot = service.refresh()?;
        let mut session = Self {
            service,
            snapshot: Snapshot::default(),
            controls,
            view: Vec::new(),
        };
        session.install(snapshot);
        Ok(session)
    }

    pub fn on_add(&mut self, name: &str) -> RepoResult<ItemChange> {
        let refreshed = self.service.add_item(name)?;
        self.install(refreshed.snapshot);
        Ok(refreshed.outcome)
    }

    pub fn on_remove(&mut self, name: &str) -> RepoResult<ItemChange> {
        let refreshed = self.service.remove_item(name)?;
        self.install(refreshed.snapshot);
        Ok(refreshed.outcome)
    }

    /// Returns the number of records removed.
    pub fn on_clear_all(&mut self) -> RepoResult<usize> {
        let refreshed = self.service.clear_all()?;
        self.install(refreshed.snapshot);
        Ok(refreshed.outcome)
    }

    /// Re-fetches without mutating, e.g. to pick up other clients' writes.
    pub fn on_refresh(&mut self) -> RepoResult<()> {
        let snapshot = self.service.refresh()?;
        self.install(snapshot);
        Ok(())
    }

    pub fn on_search_changed(&mut self, text: &str) -> &[InventoryItem] {
        self.controls.search = text.to_string();
        self.recompute();
        &self.view
    }

    pub fn on_sort_control_changed(&mut self, control: SortControl) -> &[InventoryItem] {
        match control {
            SortControl::Date(order) => self.controls.date_order = order,
            SortControl::Quantity(order) => self.controls.quantity_order = order,
        }
        self.recompute();
        &self.view
    }

    /// Current derived view.
    pub fn view(&self) -> &[InventoryItem] {
        &self.view
    }

    /// Current derived view as render rows.
    pub fn rows(&self) -> Vec<ItemRow> {
        self.view.iter().map(ItemRow::from).collect()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    fn install(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.view = self.controls.apply(self.snapshot.items());
    }
}
