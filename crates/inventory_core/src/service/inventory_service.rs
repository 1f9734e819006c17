//! Inventory use-case service.
//!
//! # Responsibility
//! - Run each mutation followed by a full re-fetch.
//! - Hand callers the mutation outcome together with the new snapshot.
//!
//! # Invariants
//! - A mutation that succeeds always returns a snapshot fetched after it.
//! - A failed mutation skips the re-fetch and returns the error unchanged.

use crate::model::snapshot::Snapshot;
use crate::repo::inventory_repo::{InventoryRepository, ItemChange, RepoResult};

/// Mutation outcome paired with the snapshot fetched right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refreshed<T> {
    pub outcome: T,
    pub snapshot: Snapshot,
}

/// Use-case wrapper around an [`InventoryRepository`].
pub struct InventoryService<R: InventoryRepository> {
    repo: R,
}

impl<R: InventoryRepository> InventoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Fetches the current snapshot.
    pub fn refresh(&self) -> RepoResult<Snapshot> {
        Ok(Snapshot::new(self.repo.fetch_all()?))
    }

    /// Adds one unit of `name`.
    pub fn add_item(&self, name: &str) -> RepoResult<Refreshed<ItemChange>> {
        let outcome = self.repo.increment(name)?;
        self.refreshed(outcome)
    }

    /// Removes one unit of `name`. Absent names are a no-op.
    pub fn remove_item(&self, name: &str) -> RepoResult<Refreshed<ItemChange>> {
        let outcome = self.repo.decrement(name)?;
        self.refreshed(outcome)
    }

    /// Deletes every record; `outcome` is the number removed.
    pub fn clear_all(&self) -> RepoResult<Refreshed<usize>> {
        let outcome = self.repo.clear_all()?;
        self.refreshed(outcome)
    }

    fn refreshed<T>(&self, outcome: T) -> RepoResult<Refreshed<T>> {
        Ok(Refreshed {
            outcome,
            snapshot: self.refresh()?,
        })
    }
}
