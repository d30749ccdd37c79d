//! Typed persistence for shopping-list state.
//!
//! # Responsibility
//! - Map each record (items, templates, categories, reminder flag/time) to a
//!   fixed key and encoding.
//! - Report whether a list record was never written, written empty, or
//!   written with rows.
//!
//! # Invariants
//! - List records are JSON arrays written as full snapshots.
//! - An absent or blank value means "never initialized"; `[]` means
//!   "deliberately emptied".
//! - Decoded rows are repaired (quantity clamped to >= 1) before they reach
//!   the stores; rows that cannot be repaired are dropped and listed in
//!   `StoredList::skipped`. One bad row never discards its neighbours.
//! - Reminder flag and time are independent records and load independently.

use crate::model::category::Category;
use crate::model::item::Item;
use crate::model::notification::{
    decode_enabled_flag, decode_time_of_day, encode_enabled_flag, encode_time_of_day,
    NotificationValueError,
};
use crate::model::template::TemplateItem;
use crate::repo::kv_store::{KvError, KvStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ITEMS_KEY: &str = "SHOPPING_LIST_DATA";
pub const TEMPLATES_KEY: &str = "TEMPLATE_DATA";
pub const CATEGORIES_KEY: &str = "CATEGORY_DATA";
pub const NOTIFICATION_ENABLED_KEY: &str = "NOTIFICATION_ENABLED";
pub const NOTIFICATION_TIME_KEY: &str = "NOTIFICATION_TIME";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure for one record.
#[derive(Debug)]
pub enum RepoError {
    Kv(KvError),
    /// Stored bytes are not valid JSON for the record shape.
    Corrupt { key: &'static str, message: String },
    /// Stored value decoded but violates a model invariant.
    InvalidData { key: &'static str, message: String },
    /// In-memory value could not be encoded.
    Encode { key: &'static str, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Corrupt { key, message } => write!(f, "corrupt record `{key}`: {message}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted data in `{key}`: {message}")
            }
            Self::Encode { key, message } => write!(f, "failed to encode `{key}`: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

/// Initialization state of a list record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    NeverInitialized,
    InitializedEmpty,
    InitializedNonEmpty,
}

/// Decoded list record plus its initialization state.
///
/// `status` reflects the stored array before unrepairable rows were dropped,
/// so a record whose rows were all dropped still counts as non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredList<T> {
    pub status: StorageStatus,
    pub records: Vec<T>,
    /// One reason per dropped row.
    pub skipped: Vec<String>,
}

impl<T> StoredList<T> {
    fn from_option(records: Option<Vec<T>>) -> Self {
        let status = match &records {
            None => StorageStatus::NeverInitialized,
            Some(records) if records.is_empty() => StorageStatus::InitializedEmpty,
            Some(_) => StorageStatus::InitializedNonEmpty,
        };
        Self {
            status,
            records: records.unwrap_or_default(),
            skipped: Vec::new(),
        }
    }

    fn repair_rows<E: Display>(mut self, repair: impl Fn(T) -> Result<T, E>) -> Self {
        let mut kept = Vec::with_capacity(self.records.len());
        for row in self.records {
            match repair(row) {
                Ok(row) => kept.push(row),
                Err(err) => self.skipped.push(err.to_string()),
            }
        }
        self.records = kept;
        self
    }
}

/// Typed view over a key-value store.
pub struct StateRepository<K: KvStore> {
    kv: K,
}

impl<K: KvStore> StateRepository<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Loads items, clamping zero quantities and dropping keyless or
    /// label-less rows.
    ///
    /// # Errors
    /// - `Corrupt` when the record is not a JSON array of items.
    pub fn load_items(&self) -> RepoResult<StoredList<Item>> {
        let stored = StoredList::from_option(self.read_json::<Item>(ITEMS_KEY)?);
        Ok(stored.repair_rows(Item::repaired))
    }

    pub fn save_items(&self, items: &[Item]) -> RepoResult<()> {
        self.write_json(ITEMS_KEY, items)
    }

    /// Loads templates with the same row repair as `load_items`.
    pub fn load_templates(&self) -> RepoResult<StoredList<TemplateItem>> {
        let stored = StoredList::from_option(self.read_json::<TemplateItem>(TEMPLATES_KEY)?);
        Ok(stored.repair_rows(TemplateItem::repaired))
    }

    pub fn save_templates(&self, templates: &[TemplateItem]) -> RepoResult<()> {
        self.write_json(TEMPLATES_KEY, templates)
    }

    pub fn load_categories(&self) -> RepoResult<StoredList<Category>> {
        Ok(StoredList::from_option(
            self.read_json::<Category>(CATEGORIES_KEY)?,
        ))
    }

    pub fn save_categories(&self, categories: &[Category]) -> RepoResult<()> {
        self.write_json(CATEGORIES_KEY, categories)
    }

    /// Stored reminder flag; `None` when never written.
    pub fn load_notification_enabled(&self) -> RepoResult<Option<bool>> {
        self.read_text(NOTIFICATION_ENABLED_KEY)?
            .map(|flag| {
                decode_enabled_flag(&flag)
                    .map_err(|err: NotificationValueError| invalid(NOTIFICATION_ENABLED_KEY, err))
            })
            .transpose()
    }

    /// Stored reminder `(hour, minute)`; `None` when never written.
    pub fn load_notification_time(&self) -> RepoResult<Option<(u8, u8)>> {
        self.read_text(NOTIFICATION_TIME_KEY)?
            .map(|time| decode_time_of_day(&time).map_err(|err| invalid(NOTIFICATION_TIME_KEY, err)))
            .transpose()
    }

    pub fn save_notification_enabled(&self, enabled: bool) -> RepoResult<()> {
        self.kv
            .set(NOTIFICATION_ENABLED_KEY, encode_enabled_flag(enabled).as_bytes())?;
        Ok(())
    }

    pub fn save_notification_time(&self, hour: u8, minute: u8) -> RepoResult<()> {
        self.kv
            .set(NOTIFICATION_TIME_KEY, encode_time_of_day(hour, minute).as_bytes())?;
        Ok(())
    }

    fn read_text(&self, key: &'static str) -> RepoResult<Option<String>> {
        let Some(bytes) = self.kv.get(key)? else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes).map_err(|err| RepoError::Corrupt {
            key,
            message: err.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }

    fn read_json<T: DeserializeOwned>(&self, key: &'static str) -> RepoResult<Option<Vec<T>>> {
        let Some(text) = self.read_text(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| RepoError::Corrupt {
                key,
                message: err.to_string(),
            })
    }

    fn write_json<T: Serialize>(&self, key: &'static str, records: &[T]) -> RepoResult<()> {
        let encoded = serde_json::to_vec(records).map_err(|err| RepoError::Encode {
            key,
            message: err.to_string(),
        })?;
        self.kv.set(key, &encoded)?;
        Ok(())
    }
}

fn invalid(key: &'static str, err: impl Display) -> RepoError {
    RepoError::InvalidData {
        key,
        message: err.to_string(),
    }
}
