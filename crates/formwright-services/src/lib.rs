//! Formwright Services Layer
//!
//! Business services sitting between the HTTP layer and the stores: the
//! submission assembler (validation plus media uploads) and AI schema
//! generation. Storage types are re-exported so the API crate depends on a
//! single service facade.

pub mod generator;
pub mod submission;

pub use formwright_storage::{
    create_storage, Storage, StorageBackend, StorageError, StorageResult, StoredObject,
};
pub use generator::{
    extract_json_object, generate_schema, regenerate_schema, GeminiGenerator, SchemaGenerator,
};
pub use submission::{SubmissionAssembler, UploadLedger, DEFAULT_UPLOAD_CONCURRENCY};
