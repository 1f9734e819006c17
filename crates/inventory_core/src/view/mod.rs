//! Derived views over inventory snapshots.
//!
//! # Responsibility
//! - Filter and order snapshots for display (`filter`).
//! - Hold per-session snapshot and control state, and expose the UI intents
//!   (`session`).
//!
//! # Invariants
//! - Derived views are recomputed from the full snapshot, never patched.
//! - Snapshot state is owned by the caller; there is no global view state.

pub mod filter;
pub mod session;
