use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use utoipa::ToSchema;

use super::field::FieldDefinition;
use crate::error::SchemaError;

/// Ordered, named set of field definitions describing a form.
///
/// Values only come out of [`FormSchema::accept`], [`FormSchema::accept_fields`] or
/// [`FormSchema::from_parts`], so every instance has a non-empty title, an
/// `order` on every field and unique field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "JsonValue")]
pub struct FormSchema {
    pub(crate) title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    pub(crate) fields: Vec<FieldDefinition>,
    #[serde(skip)]
    pub(crate) index: HashMap<String, usize>,
}

impl FormSchema {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fields in the order they were authored
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FieldDefinition> {
        self.fields
    }

    /// Resolve a field definition by its unique name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields sorted by their declared `order` (stable for equal orders)
    pub fn display_order(&self) -> Vec<&FieldDefinition> {
        let mut ordered: Vec<&FieldDefinition> = self.fields.iter().collect();
        ordered.sort_by_key(|f| f.order);
        ordered
    }

    /// Same schema with a different title/description (owner edits)
    pub fn retitled(mut self, title: String, description: Option<String>) -> Result<Self, SchemaError> {
        if title.trim().is_empty() {
            return Err(SchemaError::MissingTitle);
        }
        self.title = title.trim().to_string();
        self.description = description;
        Ok(self)
    }
}

impl TryFrom<JsonValue> for FormSchema {
    type Error = SchemaError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        FormSchema::accept(value)
    }
}
