//! Core domain logic for the inventory tracker.
//! This crate is the single source of truth for inventory invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigOverrides, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{InventoryItem, ItemDecodeError, INVENTORY_COLLECTION};
pub use model::snapshot::Snapshot;
pub use repo::inventory_repo::{
    InventoryRepository, ItemChange, RepoError, RepoResult, StoreInventoryRepository,
};
pub use service::inventory_service::{InventoryService, Refreshed};
pub use store::{
    Document, DocumentSnapshot, DocumentStore, SqliteDocumentStore, StoreError, StoreResult,
};
pub use view::filter::{apply, ControlParseError, DateOrder, QuantityOrder, ViewControls};
pub use view::session::{InventorySession, ItemRow, SortControl};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
