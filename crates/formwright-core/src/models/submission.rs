use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::field::FieldType;

/// One submitted value as sent by the client, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmissionEntry {
    pub field_name: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub value: Option<JsonValue>,
}

impl RawSubmissionEntry {
    pub fn new(field_name: impl Into<String>, value: Option<JsonValue>) -> Self {
        Self {
            field_name: field_name.into(),
            value,
        }
    }
}

/// An uploaded file held in memory until it is handed to the media store
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Uploaded files plus the parallel list of field-name tags.
///
/// The tag at position `i` names the field that file `i` belongs to; a file
/// without a tag belongs to no field.
#[derive(Debug, Clone, Default)]
pub struct TaggedFiles {
    files: Vec<FileUpload>,
    tags: Vec<String>,
}

impl TaggedFiles {
    pub fn new(files: Vec<FileUpload>, tags: Vec<String>) -> Self {
        Self { files, tags }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files whose tag equals `field_name`, in upload order
    pub fn for_field<'a>(&'a self, field_name: &'a str) -> impl Iterator<Item = &'a FileUpload> + 'a {
        self.files
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.tags.get(*i).map(String::as_str) == Some(field_name))
            .map(|(_, file)| file)
    }
}

/// Lifecycle state of a submission, changed only by the form creator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "submission_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl FromStr for SubmissionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid submission status: {}", s)),
        }
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Approved => write!(f, "approved"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A validated field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldResponse {
    pub field_name: String,
    /// Declared type of the matched field definition
    pub field_type: FieldType,
    #[schema(value_type = Option<Object>)]
    pub value: Option<JsonValue>,
    #[serde(default)]
    pub file_references: Vec<String>,
    /// Media store keys backing `file_references`, same order
    #[serde(default)]
    pub storage_keys: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Normalized, validated result of one form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub responses: Vec<FieldResponse>,
    pub total_files: u32,
    pub total_file_size: u64,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SubmissionRecord {
    /// Responses of `file` fields that stored at least one file
    pub fn file_responses(&self) -> impl Iterator<Item = &FieldResponse> {
        self.responses
            .iter()
            .filter(|r| r.field_type.is_file() && !r.file_references.is_empty())
    }

    /// All media store keys referenced by this record
    pub fn storage_keys(&self) -> impl Iterator<Item = &str> {
        self.responses
            .iter()
            .flat_map(|r| r.storage_keys.iter().map(String::as_str))
    }
}

/// Request metadata captured at submission time
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitterInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Persisted submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Submission {
    pub id: Uuid,
    pub form_id: Uuid,
    pub submitter: SubmitterInfo,
    pub responses: Vec<FieldResponse>,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub total_files: i32,
    pub total_file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    pub fn storage_keys(&self) -> impl Iterator<Item = &str> {
        self.responses
            .iter()
            .flat_map(|r| r.storage_keys.iter().map(String::as_str))
    }
}

/// Creator's review decision
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSubmissionStatusRequest {
    pub status: SubmissionStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionStatusResponse {
    pub id: Uuid,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_submission_limit")]
    pub limit: u32,
    pub status: Option<SubmissionStatus>,
}

fn default_page() -> u32 {
    1
}

fn default_submission_limit() -> u32 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionListResponse {
    pub submissions: Vec<Submission>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub message: String,
    pub submission_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_files_correlate_by_position() {
        let files = TaggedFiles::new(
            vec![
                FileUpload::new("a.pdf", "application/pdf", b"a".to_vec()),
                FileUpload::new("b.png", "image/png", b"b".to_vec()),
                FileUpload::new("c.pdf", "application/pdf", b"c".to_vec()),
            ],
            vec!["resume".to_string(), "photo".to_string(), "resume".to_string()],
        );

        let resume: Vec<&str> = files.for_field("resume").map(|f| f.filename.as_str()).collect();
        assert_eq!(resume, vec!["a.pdf", "c.pdf"]);
        assert_eq!(files.for_field("photo").count(), 1);
        assert_eq!(files.for_field("cover").count(), 0);
    }

    #[test]
    fn test_untagged_files_belong_to_no_field() {
        let files = TaggedFiles::new(
            vec![
                FileUpload::new("a.pdf", "application/pdf", b"a".to_vec()),
                FileUpload::new("b.pdf", "application/pdf", b"b".to_vec()),
            ],
            vec!["resume".to_string()],
        );

        assert_eq!(files.for_field("resume").count(), 1);
        assert_eq!(files.for_field("").count(), 0);
    }

    #[test]
    fn test_raw_entry_accepts_missing_value() {
        let entries: Vec<RawSubmissionEntry> =
            serde_json::from_value(json!([{ "fieldName": "name" }, { "fieldName": "age", "value": 30 }]))
                .unwrap();
        assert_eq!(entries[0].value, None);
        assert_eq!(entries[1].value, Some(json!(30)));
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!(
            "Approved".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::Approved
        );
        assert!("archived".parse::<SubmissionStatus>().is_err());
        assert_eq!(SubmissionStatus::default().to_string(), "pending");
    }
}
