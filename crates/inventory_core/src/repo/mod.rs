//! Repository layer over the document store.
//!
//! # Responsibility
//! - Define inventory-level data access contracts.
//! - Keep document encoding and store calls away from view/service code.
//!
//! # Invariants
//! - A record whose quantity would reach zero is deleted, never stored.
//! - Store failures propagate unchanged in kind; nothing is retried.

pub mod inventory_repo;
