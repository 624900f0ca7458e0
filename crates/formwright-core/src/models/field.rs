use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Input control kind of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
    File,
    Date,
    Tel,
    Url,
}

impl FieldType {
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::File,
        FieldType::Date,
        FieldType::Tel,
        FieldType::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::File => "file",
            FieldType::Date => "date",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FieldType::File)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Declarative value rules; every rule is independently optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::length",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_length: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient::length",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_length: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub pattern: Option<String>,
}

/// File acceptance rules for `file` fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// Comma-separated MIME types, MIME wildcards or extensions, e.g. `image/*,.pdf`
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub accept: Option<String>,
    /// Maximum size of a single file in bytes
    #[serde(
        default,
        deserialize_with = "lenient::length",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub multiple: bool,
}

/// One field of a form schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub required: bool,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub placeholder: Option<String>,
    #[serde(default, deserialize_with = "lenient::options")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_config: Option<FileConfig>,
    pub order: u32,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            placeholder: None,
            options: Vec::new(),
            validation: None,
            file_config: None,
            order: 0,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_file_config(mut self, file_config: FileConfig) -> Self {
        self.file_config = Some(file_config);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Deserializers that accept the loose shapes generative models tend to emit
/// (numbers as strings, `null` for "not set") while still rejecting garbage.
mod lenient {
    use super::*;
    use serde::de::Error;

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(None),
            JsonValue::Number(n) => Ok(n.as_f64()),
            JsonValue::String(s) if s.trim().is_empty() => Ok(None),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got '{}'", s))),
            other => Err(D::Error::custom(format!("expected a number, got {}", other))),
        }
    }

    pub fn length<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match number(deserializer)? {
            None => Ok(None),
            Some(n) if n.is_finite() && n >= 0.0 => Ok(Some(n as u64)),
            Some(n) => Err(D::Error::custom(format!(
                "expected a non-negative size, got {}",
                n
            ))),
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(None),
            JsonValue::String(s) if s.is_empty() => Ok(None),
            JsonValue::String(s) => Ok(Some(s)),
            other => Err(D::Error::custom(format!("expected a string, got {}", other))),
        }
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(false),
            JsonValue::Bool(b) => Ok(b),
            JsonValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                _ => Err(D::Error::custom(format!("expected a boolean, got '{}'", s))),
            },
            other => Err(D::Error::custom(format!("expected a boolean, got {}", other))),
        }
    }

    pub fn options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonValue::String(s) => Ok(s),
                    JsonValue::Number(n) => Ok(n.to_string()),
                    other => Err(D::Error::custom(format!(
                        "options must be strings, got {}",
                        other
                    ))),
                })
                .collect(),
            other => Err(D::Error::custom(format!(
                "options must be an array, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_round_trips_lowercase() {
        let parsed: FieldType = serde_json::from_value(json!("textarea")).unwrap();
        assert_eq!(parsed, FieldType::Textarea);
        assert_eq!(serde_json::to_value(FieldType::Tel).unwrap(), json!("tel"));
        assert!(serde_json::from_value::<FieldType>(json!("slider")).is_err());
    }

    #[test]
    fn test_validation_accepts_numeric_strings_and_nulls() {
        let validation: FieldValidation = serde_json::from_value(json!({
            "min": "5",
            "max": null,
            "minLength": 2,
            "maxLength": "10",
            "pattern": ""
        }))
        .unwrap();

        assert_eq!(validation.min, Some(5.0));
        assert_eq!(validation.max, None);
        assert_eq!(validation.min_length, Some(2));
        assert_eq!(validation.max_length, Some(10));
        assert_eq!(validation.pattern, None);
    }

    #[test]
    fn test_validation_rejects_negative_length() {
        let result = serde_json::from_value::<FieldValidation>(json!({ "maxLength": -1 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_definition_defaults() {
        let field: FieldDefinition = serde_json::from_value(json!({
            "name": "email",
            "label": "Email",
            "type": "email",
            "order": 1
        }))
        .unwrap();

        assert!(!field.required);
        assert!(field.options.is_empty());
        assert!(field.validation.is_none());
        assert!(field.file_config.is_none());
    }

    #[test]
    fn test_file_config_parses_camel_case() {
        let config: FileConfig = serde_json::from_value(json!({
            "accept": "image/*,.pdf",
            "maxSize": 5242880,
            "multiple": "true"
        }))
        .unwrap();

        assert_eq!(config.accept.as_deref(), Some("image/*,.pdf"));
        assert_eq!(config.max_size, Some(5_242_880));
        assert!(config.multiple);
    }
}
