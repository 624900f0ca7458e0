//! Formwright Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! schema/field validation rules shared by every Formwright component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, FormServiceConfig};
pub use error::{AppError, ErrorMetadata, FieldRule, LogLevel, SchemaError, SubmissionError};
pub use models::*;
pub use storage_types::StorageBackend;
pub use validation::{check_file_rules, check_rules, is_absent, RuleChecker, UploadFilter};
