//! Core use-case services.
//!
//! # Responsibility
//! - Bind the stores together (cascades, template merge, selection
//!   revalidation) and flush every change write-through.
//! - Keep UI/FFI layers decoupled from storage details.
//!
//! # Invariants
//! - Stores are mutated only through these services.
//! - Persistence failures degrade to notices; in-memory state stays
//!   authoritative.

pub mod confirm;
pub mod list_service;
pub mod notice;
pub mod notification_service;
