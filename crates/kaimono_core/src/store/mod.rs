//! In-memory stores for categories, items and templates.
//!
//! # Responsibility
//! - Own the ordered collections and enforce per-store invariants.
//! - Provide the pure section projection used by list views.
//!
//! # Invariants
//! - Stores never touch persistence; the service layer flushes them.
//! - Every rejected mutation leaves the store unchanged.

pub mod category_store;
pub mod item_store;
pub mod section;
pub mod template_store;
