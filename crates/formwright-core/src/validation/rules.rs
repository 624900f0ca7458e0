//! Declarative field rules applied to submitted values and files.

use regex::RegexBuilder;
use serde_json::Value as JsonValue;

use crate::error::{FieldRule, SubmissionError};
use crate::models::{FieldDefinition, FileUpload};

const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Whether a submitted value counts as "not provided".
///
/// Missing, `null`, `""`, `false` and `[]` are absent. The number `0` is a
/// real answer and is present.
pub fn is_absent(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.is_empty(),
        Some(JsonValue::Bool(b)) => !b,
        Some(JsonValue::Array(items)) => items.is_empty(),
        Some(JsonValue::Number(_)) | Some(JsonValue::Object(_)) => false,
    }
}

/// Evaluates `validation` rules of non-file fields.
///
/// `pattern` is skipped unless enforcement is switched on.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleChecker {
    enforce_patterns: bool,
}

impl RuleChecker {
    pub fn new(enforce_patterns: bool) -> Self {
        Self { enforce_patterns }
    }

    /// Check rules in the order minLength, maxLength, min, max, pattern.
    /// The first violation wins.
    pub fn check(&self, definition: &FieldDefinition, value: &JsonValue) -> Result<(), SubmissionError> {
        let Some(validation) = &definition.validation else {
            return Ok(());
        };
        let label = definition.label.as_str();

        if let Some((length, unit)) = measured_length(value) {
            if let Some(min_length) = validation.min_length {
                if length < min_length {
                    return Err(SubmissionError::rule(
                        label,
                        FieldRule::MinLength,
                        format!("'{}' must be at least {} {}", label, min_length, unit),
                    ));
                }
            }
            if let Some(max_length) = validation.max_length {
                if length > max_length {
                    return Err(SubmissionError::rule(
                        label,
                        FieldRule::MaxLength,
                        format!("'{}' must be no more than {} {}", label, max_length, unit),
                    ));
                }
            }
        }

        if let Some(number) = numeric_reading(value) {
            if let Some(min) = validation.min {
                if number < min {
                    return Err(SubmissionError::rule(
                        label,
                        FieldRule::Min,
                        format!("'{}' must be at least {}", label, min),
                    ));
                }
            }
            if let Some(max) = validation.max {
                if number > max {
                    return Err(SubmissionError::rule(
                        label,
                        FieldRule::Max,
                        format!("'{}' must be no more than {}", label, max),
                    ));
                }
            }
        }

        if self.enforce_patterns {
            if let (Some(pattern), JsonValue::String(text)) = (&validation.pattern, value) {
                check_pattern(label, pattern, text)?;
            }
        }

        Ok(())
    }
}

/// Check `validation` rules with pattern enforcement on
pub fn check_rules(definition: &FieldDefinition, value: &JsonValue) -> Result<(), SubmissionError> {
    RuleChecker::new(true).check(definition, value)
}

fn measured_length(value: &JsonValue) -> Option<(u64, &'static str)> {
    match value {
        JsonValue::String(s) => Some((s.chars().count() as u64, "characters")),
        JsonValue::Array(items) => Some((items.len() as u64, "items")),
        _ => None,
    }
}

fn numeric_reading(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Whole-value match, as the HTML `pattern` attribute does
fn check_pattern(label: &str, pattern: &str, text: &str) -> Result<(), SubmissionError> {
    let anchored = format!("^(?:{})$", pattern);
    let regex = match RegexBuilder::new(&anchored)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(regex) => regex,
        Err(e) => {
            tracing::debug!(
                field = %label,
                pattern = %pattern,
                error = %e,
                "Skipping uncompilable field pattern"
            );
            return Ok(());
        }
    };

    if regex.is_match(text) {
        Ok(())
    } else {
        Err(SubmissionError::rule(
            label,
            FieldRule::Pattern,
            format!("'{}' has an invalid format", label),
        ))
    }
}

/// Check `fileConfig` of a file field against its correlated files.
///
/// Runs before any upload, so a rejected submission never reaches the store.
pub fn check_file_rules(definition: &FieldDefinition, files: &[&FileUpload]) -> Result<(), SubmissionError> {
    let Some(config) = &definition.file_config else {
        return Ok(());
    };
    let label = definition.label.as_str();

    if !config.multiple && files.len() > 1 {
        return Err(SubmissionError::rule(
            label,
            FieldRule::Multiple,
            format!("'{}' accepts only one file", label),
        ));
    }

    for file in files {
        if let Some(max_size) = config.max_size {
            if file.size() as u64 > max_size {
                return Err(SubmissionError::rule(
                    label,
                    FieldRule::MaxSize,
                    format!(
                        "'{}' exceeds the maximum size of {} bytes for '{}'",
                        file.filename, max_size, label
                    ),
                ));
            }
        }
        if let Some(accept) = &config.accept {
            if !accepts(accept, &file.filename, &file.content_type) {
                return Err(SubmissionError::rule(
                    label,
                    FieldRule::Accept,
                    format!("'{}' is not an accepted file type for '{}'", file.filename, label),
                ));
            }
        }
    }

    Ok(())
}

/// Match a file against an HTML-style `accept` list (`image/*,.pdf,text/csv`)
pub fn accepts(accept: &str, filename: &str, content_type: &str) -> bool {
    let filename = filename.to_lowercase();
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let mut tokens = accept
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .peekable();

    if tokens.peek().is_none() {
        return true;
    }

    tokens.any(|token| {
        if token == "*" || token == "*/*" {
            true
        } else if token.starts_with('.') {
            filename.ends_with(&token)
        } else if let Some(family) = token.strip_suffix("/*") {
            mime.split('/').next() == Some(family)
        } else {
            mime == token
        }
    })
}
