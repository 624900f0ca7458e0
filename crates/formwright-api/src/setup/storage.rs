//! Media store setup

use anyhow::{Context, Result};
use formwright_core::Config;
use formwright_services::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing media store...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize media store")?;
    tracing::info!(
        backend = %storage.backend_type(),
        key_prefix = %config.storage_key_prefix(),
        "Media store initialized"
    );
    Ok(storage)
}
