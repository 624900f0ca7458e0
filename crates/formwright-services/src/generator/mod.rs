//! AI form schema generation.
//!
//! A [`SchemaGenerator`] turns a natural-language request into raw model
//! output. Nothing it returns is trusted: the JSON object is cut out of the
//! text and goes through [`FormSchema::accept`] (new forms) or
//! [`FormSchema::accept_fields`] (regenerated field lists).

mod gemini;
pub mod prompts;

pub use gemini::GeminiGenerator;

use async_trait::async_trait;
use formwright_core::models::{FieldDefinition, Form, FormSchema};
use formwright_core::{AppError, SchemaError};
use serde_json::Value as JsonValue;

/// Source of AI-designed form schemas
#[async_trait]
pub trait SchemaGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    /// Raw model output for a new form
    async fn generate(&self, request: &str) -> Result<String, AppError>;

    /// Raw model output reworking the fields of an existing form
    async fn regenerate(
        &self,
        existing: &[FieldDefinition],
        request: &str,
        modifications: Option<&str>,
    ) -> Result<String, AppError>;
}

/// Span from the first `{` to the last `}`
pub fn extract_json_object(text: &str) -> Result<&str, SchemaError> {
    let start = text.find('{').ok_or(SchemaError::NoJson)?;
    let end = text.rfind('}').ok_or(SchemaError::NoJson)?;
    if end < start {
        return Err(SchemaError::NoJson);
    }
    Ok(&text[start..=end])
}

/// Parse a regenerated field list: a bare `[...]` array, or failing that the
/// `{...}` object around it
fn parse_json_fields(text: &str) -> Result<JsonValue, SchemaError> {
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        let before_object = text.find('{').map_or(true, |object| start < object);
        if before_object && end > start {
            if let Ok(value) = parse_json(&text[start..=end]) {
                return Ok(value);
            }
        }
    }
    extract_json_object(text).and_then(parse_json)
}

fn parse_json(span: &str) -> Result<JsonValue, SchemaError> {
    serde_json::from_str(span).map_err(|e| SchemaError::InvalidJson(e.to_string()))
}

/// Ask the generator for a new form and accept its schema
#[tracing::instrument(skip(generator, request), fields(model = %generator.model_name()))]
pub async fn generate_schema(
    generator: &dyn SchemaGenerator,
    request: &str,
) -> Result<FormSchema, AppError> {
    let text = generator.generate(request).await?;

    let schema = extract_json_object(&text)
        .and_then(parse_json)
        .and_then(FormSchema::accept)
        .map_err(|e| {
            tracing::warn!(error = %e, response_len = text.len(), "Rejected generated form schema");
            e
        })?;

    tracing::info!(
        title = %schema.title(),
        field_count = schema.len(),
        "Form schema generated"
    );

    Ok(schema)
}

/// Ask the generator to rework `form`'s fields; title and description are kept
#[tracing::instrument(skip(generator, form, request, modifications), fields(model = %generator.model_name(), form_id = %form.id))]
pub async fn regenerate_schema(
    generator: &dyn SchemaGenerator,
    form: &Form,
    request: &str,
    modifications: Option<&str>,
) -> Result<FormSchema, AppError> {
    let text = generator
        .regenerate(&form.fields, request, modifications)
        .await?;

    let schema = parse_json_fields(&text)
        .and_then(|value| {
            FormSchema::accept_fields(form.title.clone(), form.description.clone(), value)
        })
        .map_err(|e| {
            tracing::warn!(error = %e, response_len = text.len(), "Rejected regenerated form fields");
            e
        })?;

    tracing::info!(field_count = schema.len(), "Form fields regenerated");

    Ok(schema)
}
