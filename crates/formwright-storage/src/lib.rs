//! Formwright Storage Library
//!
//! This crate provides the media store used for files attached to form
//! submissions: the Storage trait and implementations for S3 and the local
//! filesystem.
//!
//! # Storage key format
//!
//! All backends use the same key layout:
//!
//! `{prefix}/{form_id}/{field_name}/{unix_millis}-{random}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use formwright_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
