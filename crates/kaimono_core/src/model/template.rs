//! Reusable item template model.
//!
//! # Invariants
//! - Template ids live in their own namespace (uuid v4 text), so they never
//!   collide with item keys.
//! - `default_quantity >= 1`.

use crate::model::item::{clamp_quantity, MIN_QUANTITY};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable template identifier.
pub type TemplateId = String;

/// Validation errors for persisted template records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    EmptyId,
    EmptyLabel,
    ZeroQuantity { id: TemplateId },
}

impl Display for TemplateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "template id must not be empty"),
            Self::EmptyLabel => write!(f, "template label must not be blank"),
            Self::ZeroQuantity { id } => {
                write!(f, "template `{id}` default quantity must be >= {MIN_QUANTITY}")
            }
        }
    }
}

impl Error for TemplateValidationError {}

/// Saved recipe for re-adding a common item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateItem {
    pub id: TemplateId,
    pub label: String,
    pub category: String,
    pub default_quantity: u32,
}

impl TemplateItem {
    /// Creates a template with a generated id.
    pub fn new(label: impl Into<String>, category: impl Into<String>, default_quantity: u32) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), label, category, default_quantity)
    }

    pub fn with_id(
        id: impl Into<TemplateId>,
        label: impl Into<String>,
        category: impl Into<String>,
        default_quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: category.into(),
            default_quantity: clamp_quantity(default_quantity),
        }
    }

    /// Clamps the default quantity, then validates id and label.
    pub fn repaired(mut self) -> Result<Self, TemplateValidationError> {
        self.default_quantity = clamp_quantity(self.default_quantity);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if self.id.is_empty() {
            return Err(TemplateValidationError::EmptyId);
        }
        if self.label.trim().is_empty() {
            return Err(TemplateValidationError::EmptyLabel);
        }
        if self.default_quantity < MIN_QUANTITY {
            return Err(TemplateValidationError::ZeroQuantity {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}
