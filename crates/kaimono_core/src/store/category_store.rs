//! Ordered category set.
//!
//! # Invariants
//! - Names are unique (exact, case-sensitive comparison).
//! - The set always holds at least one category.
//! - Order is user-controlled and drives section order.

use crate::model::category::{default_categories, Category, FALLBACK_CATEGORY_COLOR};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected category mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    /// Name is blank after trim.
    EmptyName,
    /// Another category already uses the name.
    DuplicateName(String),
    /// No category has the name.
    NotFound(String),
    /// Removing would leave the set empty.
    LastCategory(String),
    /// Reorder input is empty.
    EmptySet,
    /// Reorder input is not a permutation of the current set.
    ReorderMismatch,
}

impl Display for CategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "category name must not be blank"),
            Self::DuplicateName(name) => write!(f, "category already exists: {name}"),
            Self::NotFound(name) => write!(f, "category not found: {name}"),
            Self::LastCategory(name) => {
                write!(f, "cannot remove the last remaining category: {name}")
            }
            Self::EmptySet => write!(f, "category set must not be empty"),
            Self::ReorderMismatch => {
                write!(f, "reordered categories must match the current set")
            }
        }
    }
}

impl Error for CategoryError {}

/// Ordered, non-empty set of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStore {
    categories: Vec<Category>,
}

impl Default for CategoryStore {
    fn default() -> Self {
        Self {
            categories: default_categories(),
        }
    }
}

impl CategoryStore {
    /// Builds a store from persisted or caller-provided categories.
    ///
    /// # Errors
    /// - `EmptySet` when `categories` is empty.
    /// - `EmptyName` / `DuplicateName` when names violate uniqueness.
    pub fn new(categories: Vec<Category>) -> Result<Self, CategoryError> {
        ensure_valid_set(&categories)?;
        Ok(Self { categories })
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn first(&self) -> &Category {
        &self.categories[0]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.name.as_str())
    }

    /// Display color for `name`, or the fallback for dangling references.
    pub fn color_of(&self, name: &str) -> &str {
        self.get(name)
            .map(|category| category.color.as_str())
            .unwrap_or(FALLBACK_CATEGORY_COLOR)
    }

    /// Appends a category with a trimmed name.
    pub fn add(&mut self, name: &str, color: impl Into<String>) -> Result<&Category, CategoryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if self.contains(trimmed) {
            return Err(CategoryError::DuplicateName(trimmed.to_string()));
        }
        self.categories.push(Category::new(trimmed, color));
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Removes a category by exact name. Items that reference it are left as is.
    pub fn remove(&mut self, name: &str) -> Result<Category, CategoryError> {
        let index = self
            .categories
            .iter()
            .position(|category| category.name == name)
            .ok_or_else(|| CategoryError::NotFound(name.to_string()))?;
        if self.categories.len() <= 1 {
            return Err(CategoryError::LastCategory(name.to_string()));
        }
        Ok(self.categories.remove(index))
    }

    /// Replaces the whole ordered set (drag-to-reorder result).
    ///
    /// The input must carry exactly the current names; colors are taken from
    /// the input.
    pub fn reorder(&mut self, reordered: Vec<Category>) -> Result<(), CategoryError> {
        ensure_valid_set(&reordered).map_err(|err| match err {
            CategoryError::EmptySet => CategoryError::EmptySet,
            _ => CategoryError::ReorderMismatch,
        })?;
        if reordered.len() != self.categories.len()
            || reordered.iter().any(|category| !self.contains(&category.name))
        {
            return Err(CategoryError::ReorderMismatch);
        }
        self.categories = reordered;
        Ok(())
    }

    /// Moves one category from `from` to `to` (both indexes into the current order).
    pub fn move_category(&mut self, from: usize, to: usize) -> Result<(), CategoryError> {
        if from >= self.categories.len() || to >= self.categories.len() {
            return Err(CategoryError::ReorderMismatch);
        }
        let mut reordered = self.categories.clone();
        let moved = reordered.remove(from);
        reordered.insert(to, moved);
        self.reorder(reordered)
    }

    /// Keeps `selected` when it still exists, otherwise falls back to the first category.
    pub fn resolve_selection(&self, selected: &str) -> String {
        if self.contains(selected) {
            selected.to_string()
        } else {
            self.first().name.clone()
        }
    }
}

fn ensure_valid_set(categories: &[Category]) -> Result<(), CategoryError> {
    if categories.is_empty() {
        return Err(CategoryError::EmptySet);
    }
    let mut seen = HashSet::with_capacity(categories.len());
    for category in categories {
        if category.name.trim().is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if !seen.insert(category.name.as_str()) {
            return Err(CategoryError::DuplicateName(category.name.clone()));
        }
    }
    Ok(())
}
