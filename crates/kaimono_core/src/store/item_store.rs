//! Item collection and placement state machine.
//!
//! # Responsibility
//! - Keep items in most-recent-first order.
//! - Apply placement toggles and quantity/category edits in place.
//!
//! # Invariants
//! - Keys are unique within the store.
//! - No mutation leaves an item with `quantity < 1`.
//! - Category names are stored verbatim; the category set is not consulted.

use crate::model::item::{clamp_quantity, Item, ItemKey, Placement, MIN_QUANTITY};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected item mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Label is blank after trim.
    EmptyLabel,
    /// Another item already has the key.
    DuplicateKey(ItemKey),
    /// No item has the key.
    NotFound(ItemKey),
}

impl Display for ItemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "item label must not be blank"),
            Self::DuplicateKey(key) => write!(f, "item key already exists: {key}"),
            Self::NotFound(key) => write!(f, "item not found: {key}"),
        }
    }
}

impl Error for ItemError {}

/// Ordered item collection, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already ordered collection (e.g. loaded from storage).
    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Creates a to-buy item with a trimmed label and prepends it.
    ///
    /// # Errors
    /// - `EmptyLabel` when the label is blank.
    /// - `DuplicateKey` when `key` is already used.
    pub fn add_item(
        &mut self,
        key: ItemKey,
        label: &str,
        category: &str,
        quantity: u32,
    ) -> Result<&Item, ItemError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(ItemError::EmptyLabel);
        }
        if self.contains_key(&key) {
            return Err(ItemError::DuplicateKey(key));
        }
        self.items.insert(0, Item::new(key, trimmed, category, quantity));
        Ok(&self.items[0])
    }

    /// Flips placement for `key`. Returns the new placement, or `None` when
    /// no item matches.
    pub fn toggle_added(&mut self, key: &str) -> Option<Placement> {
        let item = self.get_mut(key)?;
        let next = item.placement().toggled();
        item.set_placement(next);
        Some(next)
    }

    /// Overwrites quantity (clamped to >= 1) and category.
    pub fn update_item(&mut self, key: &str, quantity: u32, category: &str) -> Result<&Item, ItemError> {
        let item = self.get_mut_or_err(key)?;
        item.quantity = clamp_quantity(quantity);
        item.category = category.to_string();
        Ok(item)
    }

    pub fn increment_quantity(&mut self, key: &str) -> Result<u32, ItemError> {
        self.add_quantity(key, 1)
    }

    /// Decrements by one, stopping at the minimum quantity.
    pub fn decrement_quantity(&mut self, key: &str) -> Result<u32, ItemError> {
        let item = self.get_mut_or_err(key)?;
        item.quantity = item.quantity.saturating_sub(1).max(MIN_QUANTITY);
        Ok(item.quantity)
    }

    /// Adds `delta` to the quantity in place, without moving the item.
    pub fn add_quantity(&mut self, key: &str, delta: u32) -> Result<u32, ItemError> {
        let item = self.get_mut_or_err(key)?;
        item.quantity = clamp_quantity(item.quantity.saturating_add(delta));
        Ok(item.quantity)
    }

    /// Finds a to-buy item with exactly this label and category.
    pub fn find_to_buy(&self, label: &str, category: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.added && item.label == label && item.category == category)
    }

    pub fn delete_item(&mut self, key: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.key == key)?;
        Some(self.items.remove(index))
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.key == key)
    }

    fn get_mut_or_err(&mut self, key: &str) -> Result<&mut Item, ItemError> {
        self.get_mut(key)
            .ok_or_else(|| ItemError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemError, ItemStore};
    use crate::model::item::Placement;

    #[test]
    fn add_item_prepends_and_trims() {
        let mut store = ItemStore::new();
        store.add_item("1".into(), "milk", "food", 1).unwrap();
        store.add_item("2".into(), "  eggs ", "food", 2).unwrap();
        let labels: Vec<_> = store.as_slice().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["eggs", "milk"]);
    }

    #[test]
    fn add_item_rejects_duplicate_key() {
        let mut store = ItemStore::new();
        store.add_item("1".into(), "milk", "food", 1).unwrap();
        let err = store.add_item("1".into(), "tea", "food", 1).unwrap_err();
        assert_eq!(err, ItemError::DuplicateKey("1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn toggle_missing_key_is_noop() {
        let mut store = ItemStore::new();
        store.add_item("1".into(), "milk", "food", 1).unwrap();
        assert_eq!(store.toggle_added("nope"), None);
        assert_eq!(store.toggle_added("1"), Some(Placement::Candidate));
    }

    #[test]
    fn add_quantity_keeps_position() {
        let mut store = ItemStore::new();
        store.add_item("1".into(), "milk", "food", 1).unwrap();
        store.add_item("2".into(), "eggs", "food", 1).unwrap();
        assert_eq!(store.add_quantity("1", 3).unwrap(), 4);
        assert_eq!(store.as_slice()[1].key, "1");
    }
}
