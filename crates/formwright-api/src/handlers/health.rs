//! Health check handlers

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; "healthy", "timeout", or "{prefix}: {error}"
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
    pub storage_backend: String,
    pub ai_model: String,
}

#[utoipa::path(
    get,
    path = "/api/v0/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = serde_json::Value)
    )
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

#[utoipa::path(
    get,
    path = "/api/v0/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database and media store reachable", body = HealthCheckResponse),
        (status = 503, description = "A dependency is unavailable", body = HealthCheckResponse)
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pool = state.db.pool.clone();
    let database = run_check(
        CHECK_TIMEOUT,
        async move { sqlx::query("SELECT 1").execute(&pool).await.map(drop) },
        "unhealthy",
    )
    .await;

    let storage = state.media.storage.clone();
    let storage_status = run_check(
        CHECK_TIMEOUT,
        async move {
            storage
                .exists("health-check-non-existent-key")
                .await
                .map(drop)
        },
        "unhealthy",
    )
    .await;

    let healthy = database == "healthy" && storage_status == "healthy";
    if !healthy {
        tracing::warn!(database = %database, storage = %storage_status, "Readiness check failed");
    }

    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database,
        storage: storage_status,
        storage_backend: state.media.storage.backend_type().to_string(),
        ai_model: state.ai.generator.model_name().to_string(),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
