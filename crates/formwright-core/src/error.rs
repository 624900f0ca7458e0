//! Error types module
//!
//! This module provides the core error types used throughout Formwright.
//! Service-level failures are unified under [`AppError`]; the submission pipeline
//! reports its own taxonomy through [`SubmissionError`], and untrusted schemas are
//! rejected with [`SchemaError`].
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Structural problems found in a schema produced by the generator or an edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("No valid JSON found in AI response")]
    NoJson,

    #[error("Schema is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Schema must be a JSON object")]
    NotAnObject,

    #[error("Schema title is missing or empty")]
    MissingTitle,

    #[error("Schema fields must be an array")]
    FieldsNotArray,

    #[error("Field at position {index} is not an object")]
    FieldNotObject { index: usize },

    #[error("Field at position {index} is invalid: {reason}")]
    InvalidField { index: usize, reason: String },

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),
}

/// Declarative rule that a field value or its files violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    MinLength,
    MaxLength,
    Min,
    Max,
    Pattern,
    Multiple,
    MaxSize,
    Accept,
}

impl FieldRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRule::MinLength => "minLength",
            FieldRule::MaxLength => "maxLength",
            FieldRule::Min => "min",
            FieldRule::Max => "max",
            FieldRule::Pattern => "pattern",
            FieldRule::Multiple => "multiple",
            FieldRule::MaxSize => "maxSize",
            FieldRule::Accept => "accept",
        }
    }
}

impl Display for FieldRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Rejections produced while validating and assembling a submission.
///
/// Every variant is addressed to the person filling in the form; none is
/// retried by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' is required")]
    MissingRequiredField(String),

    #[error("{message}")]
    ValidationRule {
        label: String,
        rule: FieldRule,
        message: String,
    },

    #[error("Failed to upload file: {0}")]
    FileUpload(String),

    #[error("Malformed form schema: {0}")]
    MalformedSchema(#[from] SchemaError),
}

impl SubmissionError {
    pub fn rule(label: &str, rule: FieldRule, message: impl Into<String>) -> Self {
        SubmissionError::ValidationRule {
            label: label.to_string(),
            rule,
            message: message.into(),
        }
    }

    /// Machine-readable kind, one per taxonomy entry
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::UnknownField(_) => "UnknownField",
            SubmissionError::MissingRequiredField(_) => "MissingRequiredField",
            SubmissionError::ValidationRule { .. } => "ValidationRule",
            SubmissionError::FileUpload(_) => "FileUpload",
            SubmissionError::MalformedSchema(_) => "MalformedSchema",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("AI service error: {0}")]
    Upstream(String),

    #[error("Submission rejected: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        AppError::Submission(SubmissionError::MalformedSchema(err))
    }
}

type StaticMetadata = (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
);

fn submission_error_static_metadata(err: &SubmissionError) -> StaticMetadata {
    match err {
        SubmissionError::UnknownField(_) => (
            400,
            "UNKNOWN_FIELD",
            false,
            Some("Only submit fields declared by the form"),
            false,
            LogLevel::Debug,
        ),
        SubmissionError::MissingRequiredField(_) => (
            400,
            "MISSING_REQUIRED_FIELD",
            false,
            Some("Fill in every required field"),
            false,
            LogLevel::Debug,
        ),
        SubmissionError::ValidationRule { .. } => (
            400,
            "VALIDATION_RULE_FAILED",
            false,
            Some("Correct the highlighted value and submit again"),
            false,
            LogLevel::Debug,
        ),
        SubmissionError::FileUpload(_) => (
            500,
            "FILE_UPLOAD_FAILED",
            true,
            Some("Retry the submission after a short delay"),
            false,
            LogLevel::Error,
        ),
        SubmissionError::MalformedSchema(_) => (
            500,
            "MALFORMED_SCHEMA",
            true,
            Some("Try again with a different prompt"),
            false,
            LogLevel::Warn,
        ),
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> StaticMetadata {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Only the form owner can perform this action"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Upstream(_) => (
            502,
            "AI_SERVICE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Submission(inner) => submission_error_static_metadata(inner),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Upstream(_) => "Upstream",
            AppError::Submission(inner) => inner.kind(),
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Upstream(_) => "AI service request failed".to_string(),
            AppError::Submission(inner) => inner.to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Form not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Form not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_submission_errors_are_client_errors() {
        let err = AppError::from(SubmissionError::UnknownField("nickname".to_string()));
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "UNKNOWN_FIELD");
        assert_eq!(err.client_message(), "Unknown field: nickname");
        assert_eq!(err.error_type(), "UnknownField");

        let err = AppError::from(SubmissionError::rule(
            "Age",
            FieldRule::Min,
            "'Age' must be at least 18",
        ));
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_RULE_FAILED");
        assert_eq!(err.client_message(), "'Age' must be at least 18");
    }

    #[test]
    fn test_file_upload_error_is_recoverable_server_error() {
        let err = AppError::from(SubmissionError::FileUpload("resume.pdf".to_string()));
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to upload file: resume.pdf");
    }

    #[test]
    fn test_schema_error_converts_to_malformed_schema() {
        let err = AppError::from(SchemaError::MissingTitle);
        assert_eq!(err.error_code(), "MALFORMED_SCHEMA");
        assert!(err.client_message().contains("title"));
    }

    #[test]
    fn test_sensitive_errors_hide_internals() {
        let err = AppError::Internal("connection reset by peer".to_string());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.suggested_action(), Some("Retry after a short delay"));
    }

    #[test]
    fn test_field_rule_names() {
        assert_eq!(FieldRule::MinLength.to_string(), "minLength");
        assert_eq!(FieldRule::MaxSize.as_str(), "maxSize");
    }
}
