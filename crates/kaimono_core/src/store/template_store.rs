//! Template collection.
//!
//! # Invariants
//! - Newest template first.
//! - Deleting a template never touches items created from it.

use crate::model::template::{TemplateId, TemplateItem};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    EmptyLabel,
    NotFound(TemplateId),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "template label must not be blank"),
            Self::NotFound(id) => write!(f, "template not found: {id}"),
        }
    }
}

impl Error for TemplateError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateStore {
    templates: Vec<TemplateItem>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates(templates: Vec<TemplateItem>) -> Self {
        Self { templates }
    }

    pub fn as_slice(&self) -> &[TemplateItem] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TemplateItem> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Prepends a template with a trimmed label and a fresh id.
    pub fn add_template(
        &mut self,
        label: &str,
        category: &str,
        default_quantity: u32,
    ) -> Result<&TemplateItem, TemplateError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(TemplateError::EmptyLabel);
        }
        self.templates
            .insert(0, TemplateItem::new(trimmed, category, default_quantity));
        Ok(&self.templates[0])
    }

    pub fn delete_template(&mut self, id: &str) -> Result<TemplateItem, TemplateError> {
        let index = self
            .templates
            .iter()
            .position(|template| template.id == id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        Ok(self.templates.remove(index))
    }
}
