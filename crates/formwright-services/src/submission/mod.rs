//! Submission validation and assembly.
//!
//! Turns the raw entries and tagged files of one submission into a
//! [`SubmissionRecord`], uploading every correlated file to the media store on
//! the way. Nothing is persisted here; the caller stores the record.

mod ledger;

pub use ledger::UploadLedger;

use chrono::Utc;
use formwright_core::models::{
    FieldDefinition, FieldResponse, FileUpload, FormSchema, RawSubmissionEntry, SubmissionRecord,
    SubmissionStatus, TaggedFiles,
};
use formwright_core::{check_file_rules, is_absent, Config, RuleChecker, SubmissionError};
use formwright_storage::keys::{unique_name, upload_folder};
use formwright_storage::{Storage, StorageError, StoredObject};
use futures::stream::{self, StreamExt};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// Validates submissions against a form schema and uploads their files
#[derive(Clone)]
pub struct SubmissionAssembler {
    storage: Arc<dyn Storage>,
    key_prefix: String,
    upload_concurrency: usize,
    cleanup_partial_uploads: bool,
    rules: RuleChecker,
}

impl SubmissionAssembler {
    pub fn new(storage: Arc<dyn Storage>, key_prefix: impl Into<String>) -> Self {
        Self {
            storage,
            key_prefix: key_prefix.into(),
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            cleanup_partial_uploads: false,
            rules: RuleChecker::default(),
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::new(storage, config.storage_key_prefix())
            .with_upload_concurrency(config.upload_concurrency())
            .with_cleanup_partial_uploads(config.cleanup_partial_uploads())
            .with_rule_checker(RuleChecker::new(config.enforce_field_patterns()))
    }

    pub fn with_upload_concurrency(mut self, concurrency: usize) -> Self {
        self.upload_concurrency = concurrency.max(1);
        self
    }

    pub fn with_cleanup_partial_uploads(mut self, cleanup: bool) -> Self {
        self.cleanup_partial_uploads = cleanup;
        self
    }

    pub fn with_rule_checker(mut self, rules: RuleChecker) -> Self {
        self.rules = rules;
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Validate `entries` in the order given and assemble the record.
    ///
    /// The first violation aborts the whole submission. Calling this twice
    /// with the same input uploads the files twice.
    #[tracing::instrument(
        skip(self, schema, entries, files),
        fields(form_id = %form_id, entries = entries.len(), files = files.len())
    )]
    pub async fn validate_and_assemble(
        &self,
        schema: &FormSchema,
        form_id: Uuid,
        entries: Vec<RawSubmissionEntry>,
        files: &TaggedFiles,
    ) -> Result<SubmissionRecord, SubmissionError> {
        let mut ledger = UploadLedger::new();

        match self
            .assemble(schema, form_id, entries, files, &mut ledger)
            .await
        {
            Ok(responses) => {
                let record = SubmissionRecord {
                    responses,
                    total_files: ledger.total_files(),
                    total_file_size: ledger.total_bytes(),
                    status: SubmissionStatus::Pending,
                    notes: None,
                };
                ledger.commit();
                Ok(record)
            }
            Err(err) => {
                tracing::debug!(error = %err, kind = err.kind(), "Submission rejected");
                ledger
                    .abort(self.storage.as_ref(), self.cleanup_partial_uploads)
                    .await;
                Err(err)
            }
        }
    }

    async fn assemble(
        &self,
        schema: &FormSchema,
        form_id: Uuid,
        entries: Vec<RawSubmissionEntry>,
        files: &TaggedFiles,
        ledger: &mut UploadLedger,
    ) -> Result<Vec<FieldResponse>, SubmissionError> {
        let mut responses = Vec::with_capacity(entries.len());

        for entry in entries {
            let definition = schema
                .field(&entry.field_name)
                .ok_or_else(|| SubmissionError::UnknownField(entry.field_name.clone()))?;

            let response = if definition.field_type.is_file() {
                self.file_response(definition, form_id, files, ledger)
                    .await?
            } else {
                self.value_response(definition, entry.value)?
            };

            responses.push(response);
        }

        Ok(responses)
    }

    fn value_response(
        &self,
        definition: &FieldDefinition,
        value: Option<JsonValue>,
    ) -> Result<FieldResponse, SubmissionError> {
        let absent = is_absent(value.as_ref());
        if definition.required && absent {
            return Err(SubmissionError::MissingRequiredField(
                definition.label.clone(),
            ));
        }

        if let (false, Some(value)) = (absent, value.as_ref()) {
            self.rules.check(definition, value)?;
        }

        Ok(FieldResponse {
            field_name: definition.name.clone(),
            field_type: definition.field_type,
            value,
            file_references: Vec::new(),
            storage_keys: Vec::new(),
            submitted_at: Utc::now(),
        })
    }

    async fn file_response(
        &self,
        definition: &FieldDefinition,
        form_id: Uuid,
        files: &TaggedFiles,
        ledger: &mut UploadLedger,
    ) -> Result<FieldResponse, SubmissionError> {
        let field_files: Vec<&FileUpload> = files.for_field(&definition.name).collect();

        if field_files.is_empty() && definition.required {
            return Err(SubmissionError::MissingRequiredField(
                definition.label.clone(),
            ));
        }

        check_file_rules(definition, &field_files)?;

        let folder = upload_folder(&self.key_prefix, form_id, &definition.name);
        let stored = self.upload_all(&folder, &field_files, ledger).await?;

        let file_references: Vec<String> = stored.iter().map(|o| o.reference.clone()).collect();
        let storage_keys: Vec<String> = stored.into_iter().map(|o| o.key).collect();
        let value = if file_references.is_empty() {
            None
        } else {
            Some(JsonValue::from(file_references.clone()))
        };

        Ok(FieldResponse {
            field_name: definition.name.clone(),
            field_type: definition.field_type,
            value,
            file_references,
            storage_keys,
            submitted_at: Utc::now(),
        })
    }

    /// Upload the files of one field, at most `upload_concurrency` at a time.
    ///
    /// Results keep input order. Every stored object lands in the ledger, even
    /// when a sibling upload fails.
    async fn upload_all(
        &self,
        folder: &str,
        files: &[&FileUpload],
        ledger: &mut UploadLedger,
    ) -> Result<Vec<StoredObject>, SubmissionError> {
        let uploads: Vec<_> = files
            .iter()
            .map(|file| {
                let name = unique_name(&file.filename);
                let content_type = file.content_type.clone();
                let data = file.data.clone();
                async move {
                    self.storage
                        .upload(folder, &name, &content_type, data)
                        .await
                }
            })
            .collect();
        let results: Vec<Result<StoredObject, StorageError>> = stream::iter(uploads)
            .buffered(self.upload_concurrency)
            .collect()
            .await;

        let mut stored = Vec::with_capacity(files.len());
        let mut first_failure = None;

        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(object) => {
                    ledger.record(object.clone());
                    stored.push(object);
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        filename = %file.filename,
                        folder = %folder,
                        "File upload failed"
                    );
                    if first_failure.is_none() {
                        first_failure = Some(file.filename.clone());
                    }
                }
            }
        }

        match first_failure {
            Some(filename) => Err(SubmissionError::FileUpload(filename)),
            None => Ok(stored),
        }
    }
}
