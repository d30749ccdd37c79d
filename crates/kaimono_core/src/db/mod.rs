//! SQLite bootstrap for the durable key-value table.
//!
//! # Responsibility
//! - Open kaimono's database file (or a private in-memory one) and bring
//!   the `kv_entries` schema up to date.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection handed out by this module always has `kv_entries`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening the store or running a statement on it.
#[derive(Debug)]
pub enum DbError {
    /// Connecting or configuring the connection failed.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// Upgrading to `version` failed; the schema was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// A key-value statement failed after bootstrap.
    Query(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => write!(f, "failed to open {mode} store: {source}"),
            Self::Migration { version, source } => {
                write!(f, "kv schema migration to v{version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "kv schema v{found} was written by a newer build (supports up to v{supported})"
            ),
            Self::Query(source) => write!(f, "{source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } | Self::Query(source) => {
                Some(source)
            }
            Self::SchemaTooNew { .. } => None,
        }
    }
}
