//! Storage abstraction trait
//!
//! This module defines the Storage trait that all media store backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file persisted by the media store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Internal key, used for deletion
    pub key: String,
    /// Publicly reachable URL
    pub reference: String,
    /// Size as reported by the store
    pub bytes: u64,
}

/// Media store contract.
///
/// Callers pass a logical folder (see [`crate::keys::upload_folder`]) and a
/// unique object name; the backend persists the bytes and reports where they
/// can be fetched. Backends never retry.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` at `{folder}/{name}`
    async fn upload(
        &self,
        folder: &str,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject>;

    /// Delete an object; deleting a missing object succeeds
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
