//! Application state and sub-states.
//!
//! Handlers extract `State<Arc<AppState>>` and reach into the sub-state they
//! need: repositories under `db`, the media store and submission pipeline
//! under `media`, the schema generator under `ai`.

use formwright_core::{Config, UploadFilter};
use formwright_db::{FormRepository, SubmissionRepository};
use formwright_services::{SchemaGenerator, Storage, SubmissionAssembler};
use sqlx::PgPool;
use std::sync::Arc;

/// Database pool and repositories
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub form_repository: FormRepository,
    pub submission_repository: SubmissionRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            form_repository: FormRepository::new(pool.clone()),
            submission_repository: SubmissionRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Media store and the submission pipeline writing to it
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub assembler: SubmissionAssembler,
    pub upload_filter: UploadFilter,
}

#[derive(Clone)]
pub struct AiState {
    pub generator: Arc<dyn SchemaGenerator>,
}

pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub media: MediaState,
    pub ai: AiState,
}
