//! Global filter applied to every uploaded file before the submission pipeline.

use std::path::Path;

use crate::error::AppError;
use crate::models::FileUpload;

pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 10;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &["jpeg", "jpg", "png", "gif", "pdf", "doc", "docx", "txt", "csv"];

#[derive(Debug, thiserror::Error)]
pub enum UploadRejection {
    #[error("File too large: {filename} is {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("Invalid file type: {filename} (allowed: {allowed})")]
    InvalidExtension { filename: String, allowed: String },

    #[error("Invalid content type: {content_type} for {filename}")]
    InvalidContentType {
        filename: String,
        content_type: String,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file: {0}")]
    EmptyFile(String),
}

impl From<UploadRejection> for AppError {
    fn from(err: UploadRejection) -> Self {
        match err {
            UploadRejection::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

/// Size, extension and content-type allow list shared by all forms
#[derive(Debug, Clone)]
pub struct UploadFilter {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl Default for UploadFilter {
    fn default() -> Self {
        let allowed_extensions: Vec<String> =
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        let allowed_content_types = allowed_extensions
            .iter()
            .flat_map(|e| content_types_for_extension(e).iter().map(|ct| ct.to_string()))
            .collect();
        Self::new(
            DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            allowed_extensions,
            allowed_content_types,
        )
    }
}

impl UploadFilter {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .collect(),
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn validate_size(&self, filename: &str, size: usize) -> Result<(), UploadRejection> {
        if size == 0 {
            return Err(UploadRejection::EmptyFile(filename.to_string()));
        }
        if size > self.max_file_size {
            return Err(UploadRejection::FileTooLarge {
                filename: filename.to_string(),
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    pub fn validate_extension(&self, filename: &str) -> Result<String, UploadRejection> {
        let extension = extension_of(filename)
            .ok_or_else(|| UploadRejection::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(UploadRejection::InvalidExtension {
                filename: filename.to_string(),
                allowed: self.allowed_extensions.join(", "),
            });
        }
        Ok(extension)
    }

    /// The content type must be allowed and plausible for the extension
    pub fn validate_content_type(
        &self,
        filename: &str,
        extension: &str,
        content_type: &str,
    ) -> Result<(), UploadRejection> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let allowed = self.allowed_content_types.iter().any(|ct| ct == &normalized);
        let expected = content_types_for_extension(extension);
        let matches_extension = expected.is_empty() || expected.contains(&normalized.as_str());

        if !allowed || !matches_extension {
            return Err(UploadRejection::InvalidContentType {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    pub fn validate(&self, file: &FileUpload) -> Result<(), UploadRejection> {
        self.validate_size(&file.filename, file.size())?;
        let extension = self.validate_extension(&file.filename)?;
        self.validate_content_type(&file.filename, &extension, &file.content_type)
    }

    pub fn validate_all<'a, I>(&self, files: I) -> Result<(), UploadRejection>
    where
        I: IntoIterator<Item = &'a FileUpload>,
    {
        files.into_iter().try_for_each(|file| self.validate(file))
    }
}

/// Lowercased extension of `filename`, if it has one
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Content types a browser may send for a file with this extension
pub fn content_types_for_extension(extension: &str) -> &'static [&'static str] {
    match extension {
        "jpg" | "jpeg" => &["image/jpeg", "image/jpg", "image/pjpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "pdf" => &["application/pdf"],
        "doc" => &["application/msword"],
        "docx" => &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
        "txt" => &["text/plain"],
        "csv" => &["text/csv", "application/csv", "application/vnd.ms-excel"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(bytes: &[u8]) -> FileUpload {
        FileUpload::new("resume.pdf", "application/pdf", bytes.to_vec())
    }

    #[test]
    fn test_default_filter_accepts_document_types() {
        let filter = UploadFilter::default();
        assert!(filter.validate(&pdf(b"%PDF")).is_ok());
        assert!(filter
            .validate(&FileUpload::new("Photo.JPG", "image/jpeg", b"x".to_vec()))
            .is_ok());
        assert!(filter
            .validate(&FileUpload::new("list.csv", "text/csv; charset=utf-8", b"a".to_vec()))
            .is_ok());
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        let filter = UploadFilter::new(4, vec!["pdf".into()], vec!["application/pdf".into()]);

        assert!(matches!(
            filter.validate(&pdf(b"")),
            Err(UploadRejection::EmptyFile(_))
        ));
        let err = filter.validate(&pdf(b"12345")).unwrap_err();
        assert!(matches!(err, UploadRejection::FileTooLarge { size: 5, max: 4, .. }));
        assert!(matches!(AppError::from(err), AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_rejects_disallowed_extension() {
        let filter = UploadFilter::default();
        let exe = FileUpload::new("setup.exe", "application/octet-stream", b"MZ".to_vec());
        assert!(matches!(
            filter.validate(&exe),
            Err(UploadRejection::InvalidExtension { .. })
        ));

        let bare = FileUpload::new("README", "text/plain", b"hi".to_vec());
        assert!(matches!(
            filter.validate(&bare),
            Err(UploadRejection::InvalidFilename(_))
        ));
    }

    #[test]
    fn test_rejects_spoofed_content_type() {
        let filter = UploadFilter::default();
        let spoofed = FileUpload::new("cat.png", "application/pdf", b"x".to_vec());
        let err = filter.validate(&spoofed).unwrap_err();
        assert!(matches!(err, UploadRejection::InvalidContentType { .. }));
        assert!(matches!(AppError::from(err), AppError::InvalidInput(_)));
    }

    #[test]
    fn test_extension_normalization() {
        let filter = UploadFilter::new(1024, vec![".PDF".into()], vec!["Application/PDF".into()]);
        assert!(filter.validate(&pdf(b"x")).is_ok());
    }
}
