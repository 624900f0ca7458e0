//! Database repositories for the data access layer
//!
//! Forms and their submissions live in Postgres. Field lists and submission
//! responses are stored as JSONB documents; everything queried on is a column.

pub mod form;
pub mod submission;

pub use form::{FormPage, FormRepository, FormUpdate};
pub use submission::{SubmissionPage, SubmissionRepository};

/// Rows to skip for a 1-based page
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(limit)
}
