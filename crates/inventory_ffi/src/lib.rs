//! Flutter-facing bindings for the inventory tracker.

pub mod api;
