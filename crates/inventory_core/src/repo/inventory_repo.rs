//! Inventory repository contract and document-store implementation.
//!
//! # Responsibility
//! - Provide increment / decrement-or-delete / snapshot / clear-all over the
//!   `inventory` collection.
//! - Map store and decode failures onto repository error kinds.
//!
//! # Invariants
//! - `increment` refreshes `last_modified`; `decrement` preserves it.
//! - `clear_all` deletes the records visible when it starts, in one batch.
//!
//! # Known limitation
//! Increment and decrement are read-then-write sequences. Two clients
//! mutating the same name concurrently can lose an update (last write wins).

use crate::clock::{Clock, SystemClock};
use crate::model::item::{InventoryItem, ItemDecodeError, INVENTORY_COLLECTION};
use crate::store::{DocumentStore, StoreError};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for inventory persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// The store could not serve a call.
    StoreUnavailable(StoreError),
    /// Clear-all batch was rejected atomically; no record was deleted.
    BatchPartialFailure(StoreError),
    /// Name is empty or whitespace only.
    InvalidName(String),
    /// Stored record lacks a usable quantity or timestamp.
    InvalidData(String),
}

impl RepoError {
    /// Stable short code used in structured log lines and UI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::BatchPartialFailure(_) => "batch_partial_failure",
            Self::InvalidName(_) => "invalid_name",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable(err) => write!(f, "{err}"),
            Self::BatchPartialFailure(err) => write!(f, "{err}"),
            Self::InvalidName(name) => write!(f, "invalid item name `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) | Self::BatchPartialFailure(err) => Some(err),
            Self::InvalidName(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::BatchRejected { .. } => Self::BatchPartialFailure(value),
            StoreError::InvalidDocument { .. } => Self::InvalidData(value.to_string()),
            StoreError::InvalidKey(key) => Self::InvalidName(key),
            StoreError::Unavailable { .. } => Self::StoreUnavailable(value),
        }
    }
}

impl From<ItemDecodeError> for RepoError {
    fn from(value: ItemDecodeError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Outcome of a single-item mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    /// Absent name was created with quantity 1.
    Created,
    /// Existing record now holds `quantity`.
    Incremented { quantity: i64 },
    /// Existing record now holds `quantity`; timestamp untouched.
    Decremented { quantity: i64 },
    /// Record reached zero and was removed.
    Deleted,
    /// Decrement on a name with no record; nothing changed.
    Absent,
}

impl ItemChange {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Incremented { .. } => "incremented",
            Self::Decremented { .. } => "decremented",
            Self::Deleted => "deleted",
            Self::Absent => "absent",
        }
    }
}

/// Repository interface for inventory operations.
pub trait InventoryRepository {
    /// Returns every stored record. Order is unspecified.
    fn fetch_all(&self) -> RepoResult<Vec<InventoryItem>>;
    /// Adds one unit to `name`, creating the record when absent.
    fn increment(&self, name: &str) -> RepoResult<ItemChange>;
    /// Removes one unit from `name`, deleting the record at zero.
    fn decrement(&self, name: &str) -> RepoResult<ItemChange>;
    /// Deletes every record visible at call start. Returns how many.
    fn clear_all(&self) -> RepoResult<usize>;
}

impl<R: InventoryRepository + ?Sized> InventoryRepository for &R {
    fn fetch_all(&self) -> RepoResult<Vec<InventoryItem>> {
        (**self).fetch_all()
    }

    fn increment(&self, name: &str) -> RepoResult<ItemChange> {
        (**self).increment(name)
    }

    fn decrement(&self, name: &str) -> RepoResult<ItemChange> {
        (**self).decrement(name)
    }

    fn clear_all(&self) -> RepoResult<usize> {
        (**self).clear_all()
    }
}

/// Inventory repository over any [`DocumentStore`].
pub struct StoreInventoryRepository<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: DocumentStore> StoreInventoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: DocumentStore, C: Clock> StoreInventoryRepository<S, C> {
    /// Uses `clock` for `last_modified` stamps.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    fn load(&self, name: &str) -> RepoResult<Option<InventoryItem>> {
        match self.store.get(INVENTORY_COLLECTION, name)? {
            Some(data) => Ok(Some(InventoryItem::from_document(name, &data)?)),
            None => Ok(None),
        }
    }

    fn save(&self, item: &InventoryItem) -> RepoResult<()> {
        self.store
            .set(INVENTORY_COLLECTION, &item.name, &item.to_document())?;
        Ok(())
    }
}

impl<S: DocumentStore, C: Clock> InventoryRepository for StoreInventoryRepository<S, C> {
    fn fetch_all(&self) -> RepoResult<Vec<InventoryItem>> {
        let documents = self
            .store
            .list(INVENTORY_COLLECTION)
            .map_err(|err| log_failure("item_fetch_all", err.into()))?;

        let items = documents
            .iter()
            .map(|doc| InventoryItem::from_document(&doc.key, &doc.data))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| log_failure("item_fetch_all", err.into()))?;

        debug!(
            "event=item_fetch_all module=repo status=ok count={}",
            items.len()
        );
        Ok(items)
    }

    fn increment(&self, name: &str) -> RepoResult<ItemChange> {
        ensure_name(name)?;
        let now = self.clock.now_ms();

        let run = || -> RepoResult<ItemChange> {
            match self.load(name)? {
                Some(mut item) => {
                    item.quantity = item.quantity.checked_add(1).ok_or_else(|| {
                        RepoError::InvalidData(format!(
                            "quantity {} cannot be incremented",
                            item.quantity
                        ))
                    })?;
                    item.last_modified = now;
                    self.save(&item)?;
                    Ok(ItemChange::Incremented {
                        quantity: item.quantity,
                    })
                }
                None => {
                    self.save(&InventoryItem::new(name, 1, now))?;
                    Ok(ItemChange::Created)
                }
            }
        };

        let change = run().map_err(|err| log_failure("item_increment", err))?;
        log_change("item_increment", change);
        Ok(change)
    }

    fn decrement(&self, name: &str) -> RepoResult<ItemChange> {
        ensure_name(name)?;

        let run = || -> RepoResult<ItemChange> {
            let Some(mut item) = self.load(name)? else {
                return Ok(ItemChange::Absent);
            };

            if item.quantity <= 1 {
                self.store.delete(INVENTORY_COLLECTION, name)?;
                return Ok(ItemChange::Deleted);
            }

            item.quantity -= 1;
            self.save(&item)?;
            Ok(ItemChange::Decremented {
                quantity: item.quantity,
            })
        };

        let change = run().map_err(|err| log_failure("item_decrement", err))?;
        log_change("item_decrement", change);
        Ok(change)
    }

    fn clear_all(&self) -> RepoResult<usize> {
        let run = || -> RepoResult<usize> {
            let keys = self.store.keys(INVENTORY_COLLECTION)?;
            self.store.delete_batch(INVENTORY_COLLECTION, &keys)?;
            Ok(keys.len())
        };

        let removed = run().map_err(|err| log_failure("item_clear_all", err))?;
        info!("event=item_clear_all module=repo status=ok removed={removed}");
        Ok(removed)
    }
}

fn ensure_name(name: &str) -> RepoResult<()> {
    if name.trim().is_empty() {
        return Err(RepoError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn log_change(event: &str, change: ItemChange) {
    match change {
        ItemChange::Incremented { quantity } | ItemChange::Decremented { quantity } => info!(
            "event={event} module=repo status=ok change={} quantity={quantity}",
            change.label()
        ),
        _ => info!(
            "event={event} module=repo status=ok change={}",
            change.label()
        ),
    }
}

fn log_failure(event: &str, err: RepoError) -> RepoError {
    error!(
        "event={event} module=repo status=error error_code={} error={}",
        err.code(),
        err
    );
    err
}
