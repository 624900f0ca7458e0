//! Formwright persistence layer

pub mod db;

pub use db::{FormPage, FormRepository, FormUpdate, SubmissionPage, SubmissionRepository};

use sqlx::migrate::Migrator;
use sqlx::PgPool;

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply pending migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
