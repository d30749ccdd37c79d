//! Shopping item model.
//!
//! # Responsibility
//! - Define the persisted item record and its placement state.
//! - Generate time-based item keys.
//!
//! # Invariants
//! - `key` is assigned once at creation and never changes.
//! - `quantity >= 1` for every valid item.
//! - `added == true` means the item sits on the to-buy list, not that it was
//!   stored.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable item identifier (epoch-millisecond string for new items).
pub type ItemKey = String;

/// Smallest quantity any item or template may carry.
pub const MIN_QUANTITY: u32 = 1;

/// Which of the two lists an item is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Not yet marked for purchase (`added == false`).
    Candidate,
    /// Marked for purchase (`added == true`).
    ToBuy,
}

impl Placement {
    pub fn from_added(added: bool) -> Self {
        if added {
            Self::ToBuy
        } else {
            Self::Candidate
        }
    }

    pub fn is_added(self) -> bool {
        matches!(self, Self::ToBuy)
    }

    /// The other list.
    pub fn toggled(self) -> Self {
        match self {
            Self::Candidate => Self::ToBuy,
            Self::ToBuy => Self::Candidate,
        }
    }
}

/// Validation errors for item records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyKey,
    EmptyLabel,
    ZeroQuantity { key: ItemKey },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "item key must not be empty"),
            Self::EmptyLabel => write!(f, "item label must not be blank"),
            Self::ZeroQuantity { key } => {
                write!(f, "item `{key}` quantity must be >= {MIN_QUANTITY}")
            }
        }
    }
}

impl Error for ItemValidationError {}

/// One row on the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: ItemKey,
    pub label: String,
    /// Category name. Not checked against the category set.
    pub category: String,
    pub quantity: u32,
    pub added: bool,
}

impl Item {
    /// Creates a to-buy item with a clamped quantity.
    pub fn new(
        key: impl Into<ItemKey>,
        label: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            category: category.into(),
            quantity: clamp_quantity(quantity),
            added: true,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement::from_added(self.added)
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.added = placement.is_added();
    }

    /// Clamps the quantity, then validates what a clamp cannot fix.
    ///
    /// # Errors
    /// - `EmptyKey` / `EmptyLabel`.
    pub fn repaired(mut self) -> Result<Self, ItemValidationError> {
        self.quantity = clamp_quantity(self.quantity);
        self.validate()?;
        Ok(self)
    }

    /// Checks invariants that persisted data may have violated.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.key.is_empty() {
            return Err(ItemValidationError::EmptyKey);
        }
        if self.label.trim().is_empty() {
            return Err(ItemValidationError::EmptyLabel);
        }
        if self.quantity < MIN_QUANTITY {
            return Err(ItemValidationError::ZeroQuantity {
                key: self.key.clone(),
            });
        }
        Ok(())
    }
}

/// Raises any quantity below the minimum to the minimum.
pub fn clamp_quantity(quantity: u32) -> u32 {
    quantity.max(MIN_QUANTITY)
}

/// Demo rows shown on a first run.
pub fn demo_items() -> Vec<Item> {
    vec![
        Item::new("1", "牛乳", "食品", 2),
        Item::new("2", "卵", "食品", 1),
        Item::new("3", "洗剤", "日用品", 3),
    ]
}

/// Issues time-based item keys that never repeat within one generator.
#[derive(Debug, Default)]
pub struct ItemKeyGenerator {
    last_issued_ms: u64,
}

impl ItemKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a key from the wall clock.
    pub fn next_key(&mut self) -> ItemKey {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);
        self.next_key_at(now_ms)
    }

    /// Returns a key for `now_ms`, bumped past the last issued value when the
    /// clock has not advanced.
    pub fn next_key_at(&mut self, now_ms: u64) -> ItemKey {
        let issued = if now_ms > self.last_issued_ms {
            now_ms
        } else {
            self.last_issued_ms + 1
        };
        self.last_issued_ms = issued;
        issued.to_string()
    }
}
