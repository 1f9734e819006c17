//! Inventory domain model.
//!
//! # Invariants
//! - Item names are the identity; at most one record per name.
//! - A persisted item always has `quantity >= 1`.

pub mod item;
pub mod snapshot;
