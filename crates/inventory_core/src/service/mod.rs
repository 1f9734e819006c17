//! Core use-case services.
//!
//! # Responsibility
//! - Chain repository mutations with a fresh snapshot fetch.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod inventory_service;
