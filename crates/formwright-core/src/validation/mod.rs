//! Validation modules

pub mod rules;
pub mod schema;
pub mod upload;

pub use rules::{accepts, check_file_rules, check_rules, is_absent, RuleChecker};
pub use upload::{UploadFilter, UploadRejection};
