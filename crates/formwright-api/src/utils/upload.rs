//! Multipart parsing for form submissions

use axum::extract::Multipart;
use formwright_core::models::{FileUpload, RawSubmissionEntry, TaggedFiles};
use formwright_core::{AppError, UploadFilter};

use crate::error::HttpAppError;

const RESPONSES_PART: &str = "responses";
const FILES_PART: &str = "files";
const FILE_FIELDS_PART: &str = "fileFields";

/// Raw parts of a submission request
#[derive(Debug, Default)]
pub struct SubmissionParts {
    pub responses: Option<String>,
    pub files: Vec<FileUpload>,
    pub file_fields: Vec<String>,
}

impl SubmissionParts {
    /// Parse the entries and pair files with their tags after running
    /// every file through `filter`
    pub fn into_submission(
        self,
        filter: &UploadFilter,
    ) -> Result<(Vec<RawSubmissionEntry>, TaggedFiles), HttpAppError> {
        filter.validate_all(&self.files)?;
        let entries = parse_responses(self.responses.as_deref())?;
        Ok((entries, TaggedFiles::new(self.files, self.file_fields)))
    }
}

/// Collect the `responses`, `files` and `fileFields` parts; others are ignored
pub async fn read_submission_parts(
    mut multipart: Multipart,
) -> Result<SubmissionParts, HttpAppError> {
    let mut parts = SubmissionParts::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string).unwrap_or_default();

        match name.as_str() {
            RESPONSES_PART => {
                parts.responses = Some(field.text().await?);
            }
            FILES_PART => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "unknown".to_string());
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await?;
                parts
                    .files
                    .push(FileUpload::new(filename, content_type, data));
            }
            FILE_FIELDS_PART => {
                let text = field.text().await?;
                parts.file_fields.extend(parse_file_fields(&text));
            }
            other => {
                tracing::debug!(part = %other, "Ignoring unexpected multipart part");
            }
        }
    }

    Ok(parts)
}

/// One tag per part, or a JSON array of tags in a single part
fn parse_file_fields(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(trimmed) {
            return tags;
        }
    }
    vec![trimmed.to_string()]
}

/// Decode the `responses` part: a JSON array of `{fieldName, value}`
pub fn parse_responses(raw: Option<&str>) -> Result<Vec<RawSubmissionEntry>, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest("Invalid responses format".to_string()))?;
    serde_json::from_str::<Vec<RawSubmissionEntry>>(raw).map_err(|e| {
        tracing::debug!(error = %e, "Rejected responses part");
        AppError::BadRequest("Invalid responses format".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_responses() {
        let entries = parse_responses(Some(
            r#"[{"fieldName": "email", "value": "a@b.co"}, {"fieldName": "cv"}]"#,
        ))
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, Some(json!("a@b.co")));
        assert_eq!(entries[1].value, None);
    }

    #[test]
    fn test_parse_responses_rejects_bad_input() {
        for raw in [None, Some("not json"), Some(r#"{"fieldName": "x"}"#), Some(r#"[{"value": 1}]"#)] {
            match parse_responses(raw) {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid responses format"),
                other => panic!("unexpected result for {:?}: {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_parse_file_fields() {
        assert_eq!(parse_file_fields("resume"), vec!["resume"]);
        assert_eq!(parse_file_fields(r#"["a", "b"]"#), vec!["a", "b"]);
        assert_eq!(parse_file_fields("[not json"), vec!["[not json"]);
    }

    #[test]
    fn test_into_submission_applies_filter() {
        let parts = SubmissionParts {
            responses: Some("[]".to_string()),
            files: vec![FileUpload::new("run.exe", "application/octet-stream", vec![1u8])],
            file_fields: vec!["cv".to_string()],
        };
        let HttpAppError(err) = parts.into_submission(&UploadFilter::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let parts = SubmissionParts {
            responses: Some(r#"[{"fieldName": "cv"}]"#.to_string()),
            files: vec![FileUpload::new("cv.pdf", "application/pdf", b"%PDF".to_vec())],
            file_fields: vec!["cv".to_string()],
        };
        let (entries, files) = parts.into_submission(&UploadFilter::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(files.for_field("cv").count(), 1);
    }
}
