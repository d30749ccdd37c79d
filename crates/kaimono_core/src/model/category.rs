//! Category record and built-in defaults.
//!
//! # Invariants
//! - `name` is the identity; there is no separate id.
//! - `color` is an opaque display token owned by the UI.

use serde::{Deserialize, Serialize};

/// Color returned for items whose category no longer exists.
pub const FALLBACK_CATEGORY_COLOR: &str = "#fff";

/// Initial color offered by the new-category form.
pub const NEW_CATEGORY_DEFAULT_COLOR: &str = "#ffffff";

/// Palette offered by the new-category form.
pub const PRESET_COLORS: &[&str] = &[
    "#FFCDD2", "#F8BBD0", "#E1BEE7", "#D1C4E9", "#C5CAE9", "#BBDEFB", "#B3E5FC", "#B2EBF2",
    "#B2DFDB", "#C8E6C9", "#DCEDC8", "#F0F4C3", "#FFF9C4", "#FFECB3", "#FFE0B2",
];

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("食品", "#fce4ec"),
    ("日用品", "#e3f2fd"),
    ("飲料", "#e8f5e9"),
    ("その他", "#f3e5f5"),
];

/// User-defined grouping for items, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Returns the category set used before the user customizes anything.
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color)| Category::new(*name, *color))
        .collect()
}
