use formwright_storage::{Storage, StoredObject};

/// Objects written to the media store while one submission is assembled.
///
/// Either committed with the submission or aborted. On abort the objects are
/// left in place unless cleanup is requested, in which case each is deleted
/// best-effort.
#[derive(Debug, Default)]
pub struct UploadLedger {
    stored: Vec<StoredObject>,
}

impl UploadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, object: StoredObject) {
        self.stored.push(object);
    }

    pub fn total_files(&self) -> u32 {
        u32::try_from(self.stored.len()).unwrap_or(u32::MAX)
    }

    pub fn total_bytes(&self) -> u64 {
        self.stored.iter().map(|o| o.bytes).sum()
    }

    /// The objects now belong to the submission
    pub fn commit(self) {
        tracing::debug!(objects = self.stored.len(), "Upload ledger committed");
    }

    /// Returns how many objects were deleted
    pub async fn abort(self, storage: &dyn Storage, cleanup: bool) -> usize {
        if self.stored.is_empty() {
            return 0;
        }

        if !cleanup {
            tracing::warn!(
                orphaned_objects = self.stored.len(),
                orphaned_bytes = self.total_bytes(),
                "Submission aborted, stored objects left in place"
            );
            return 0;
        }

        let mut deleted = 0;
        for object in &self.stored {
            match storage.delete(&object.key).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        key = %object.key,
                        "Failed to delete object of aborted submission"
                    );
                }
            }
        }

        tracing::info!(
            deleted,
            total = self.stored.len(),
            "Cleaned up objects of aborted submission"
        );

        deleted
    }
}
