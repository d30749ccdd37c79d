//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the durable key-value contract consumed by core.
//! - Map typed state (items, templates, categories, reminder preferences) to
//!   fixed storage keys and JSON/string encodings.
//!
//! # Invariants
//! - Every record is written as a complete snapshot, never a delta.
//! - Read paths reject invalid persisted values instead of masking them.

pub mod kv_store;
pub mod state_repo;
