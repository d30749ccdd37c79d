//! Shopping-list domain model.
//!
//! # Responsibility
//! - Define the records persisted by core: categories, items, templates and
//!   reminder preferences.
//! - Keep value validation next to the data it guards.
//!
//! # Invariants
//! - Item quantity and template default quantity are always >= 1.
//! - `Item::category` is a soft reference by name; it may dangle.

pub mod category;
pub mod item;
pub mod notification;
pub mod template;
