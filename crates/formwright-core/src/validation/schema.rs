//! Structural acceptance of form schemas.
//!
//! Schemas come from a generative model or an owner edit and are untrusted.
//! Everything that builds a [`FormSchema`] goes through this module, so the
//! submission pipeline can rely on a non-empty title, an `order` on every
//! field and unique field names.

use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

use crate::error::SchemaError;
use crate::models::{FieldDefinition, FormSchema};

impl FormSchema {
    /// Accept a complete schema object: `{ "title", "description"?, "fields": [...] }`
    pub fn accept(value: JsonValue) -> Result<Self, SchemaError> {
        let JsonValue::Object(mut object) = value else {
            return Err(SchemaError::NotAnObject);
        };

        let title = match object.remove("title") {
            Some(JsonValue::String(title)) if !title.trim().is_empty() => title,
            _ => return Err(SchemaError::MissingTitle),
        };
        let description = optional_text(object.remove("description"));

        let fields = match object.remove("fields") {
            Some(JsonValue::Array(items)) => parse_fields(items)?,
            _ => return Err(SchemaError::FieldsNotArray),
        };

        Self::from_parts(title, description, fields)
    }

    /// Accept a replacement field list for an existing form.
    ///
    /// `value` is either `{ "fields": [...] }` or the bare array.
    pub fn accept_fields(
        title: String,
        description: Option<String>,
        value: JsonValue,
    ) -> Result<Self, SchemaError> {
        let items = match value {
            JsonValue::Array(items) => items,
            JsonValue::Object(mut object) => match object.remove("fields") {
                Some(JsonValue::Array(items)) => items,
                _ => return Err(SchemaError::FieldsNotArray),
            },
            _ => return Err(SchemaError::FieldsNotArray),
        };

        Self::from_parts(title, description, parse_fields(items)?)
    }

    /// Assemble a schema from typed parts, re-checking every structural invariant
    pub fn from_parts(
        title: String,
        description: Option<String>,
        mut fields: Vec<FieldDefinition>,
    ) -> Result<Self, SchemaError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(SchemaError::MissingTitle);
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter_mut().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::InvalidField {
                    index: position,
                    reason: "name must be a non-empty string".to_string(),
                });
            }
            if field.label.trim().is_empty() {
                return Err(SchemaError::InvalidField {
                    index: position,
                    reason: "label must be a non-empty string".to_string(),
                });
            }
            if field.order == 0 {
                field.order = position_order(position);
            }
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        Ok(Self {
            title,
            description: description.filter(|d| !d.trim().is_empty()),
            fields,
            index,
        })
    }
}

fn parse_fields(items: Vec<JsonValue>) -> Result<Vec<FieldDefinition>, SchemaError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let JsonValue::Object(mut object) = item else {
                return Err(SchemaError::FieldNotObject { index });
            };
            let order = declared_order(&object).unwrap_or_else(|| position_order(index));
            object.insert("order".to_string(), JsonValue::from(order));

            serde_json::from_value::<FieldDefinition>(JsonValue::Object(object)).map_err(|e| {
                SchemaError::InvalidField {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}

/// A declared `order` is kept only when it reads as a number of at least 1;
/// fractions are truncated. Zero, negative and fractional-below-one orders
/// fall back to the field's position.
fn declared_order(object: &Map<String, JsonValue>) -> Option<u32> {
    let order = match object.get("order")? {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if order.is_finite() && order >= 1.0 {
        Some(order.min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

fn position_order(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

fn optional_text(value: Option<JsonValue>) -> Option<String> {
    match value {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}
