//! Service initialization and application state setup

use crate::state::{AiState, AppState, DbState, MediaState};
use anyhow::{Context, Result};
use formwright_core::{Config, UploadFilter};
use formwright_services::{GeminiGenerator, SchemaGenerator, Storage, SubmissionAssembler};
use sqlx::PgPool;
use std::sync::Arc;

/// Initialize all services and repositories, returning the application state
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let generator: Arc<dyn SchemaGenerator> =
        Arc::new(GeminiGenerator::from_config(config).context("Failed to build AI client")?);
    tracing::info!(model = %generator.model_name(), "Schema generator ready");

    Ok(build_state(config, pool, storage, generator))
}

/// Assemble the state from already-built dependencies
pub fn build_state(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
    generator: Arc<dyn SchemaGenerator>,
) -> Arc<AppState> {
    let upload_filter = UploadFilter::new(
        config.max_upload_size_bytes(),
        config.allowed_upload_extensions().to_vec(),
        config.allowed_upload_content_types().to_vec(),
    );
    let assembler = SubmissionAssembler::from_config(storage.clone(), config);

    Arc::new(AppState {
        config: config.clone(),
        db: DbState::new(pool),
        media: MediaState {
            storage,
            assembler,
            upload_filter,
        },
        ai: AiState { generator },
    })
}
