//! Route configuration and setup

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::auth::JwtService;
use crate::constants::{API_PREFIX, BODY_LIMIT_FILE_COUNT, MEDIA_ROUTE, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use formwright_core::{Config, StorageBackend};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: JwtService::new(config.jwt_secret()),
    });

    let protected_routes = protected_routes()
        .layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware));
    let app_state_routes = public_routes().merge(protected_routes);

    let body_limit = request_body_limit(config.max_upload_size_bytes());
    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit = config.http_concurrency_limit(),
        "Request limits configured"
    );

    let mut app = app_state_routes
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .with_state(state);

    if config.storage_backend() == Some(StorageBackend::Local) {
        if let Some(path) = config.local_storage_path() {
            tracing::info!(path = %path, route = MEDIA_ROUTE, "Serving local media files");
            app = app.nest_service(MEDIA_ROUTE, ServeDir::new(path));
        }
    }

    Ok(app
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Body limit for a multipart submission of several maximum-size files
fn request_body_limit(max_upload_size_bytes: usize) -> usize {
    max_upload_size_bytes
        .saturating_mul(BODY_LIMIT_FILE_COUNT)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/health", API_PREFIX),
            get(handlers::health::liveness_check),
        )
        .route(
            &format!("{}/health/ready", API_PREFIX),
            get(handlers::health::readiness_check),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .route(
            &format!("{}/forms/public/{{public_id}}", API_PREFIX),
            get(handlers::forms::get_public_form),
        )
        .route(
            &format!("{}/submissions/submit/{{public_id}}", API_PREFIX),
            post(handlers::submissions::submit_form),
        )
}

/// Protected routes (require authentication)
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(ai_routes())
        .merge(form_routes())
        .merge(submission_routes())
}

fn ai_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/ai/generate-form", API_PREFIX),
            post(handlers::ai::generate_form),
        )
        .route(
            &format!("{}/ai/regenerate-form/{{form_id}}", API_PREFIX),
            post(handlers::ai::regenerate_form),
        )
}

fn form_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/forms/my-forms", API_PREFIX),
            get(handlers::forms::list_my_forms),
        )
        .route(
            &format!("{}/forms/{{form_id}}", API_PREFIX),
            get(handlers::forms::get_form)
                .put(handlers::forms::update_form)
                .delete(handlers::forms::delete_form),
        )
        .route(
            &format!("{}/forms/{{form_id}}/duplicate", API_PREFIX),
            post(handlers::forms::duplicate_form),
        )
        .route(
            &format!("{}/forms/{{form_id}}/analytics", API_PREFIX),
            get(handlers::forms::form_analytics),
        )
}

fn submission_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/submissions/form/{{form_id}}", API_PREFIX),
            get(handlers::submissions::list_form_submissions),
        )
        .route(
            &format!("{}/submissions/{{submission_id}}", API_PREFIX),
            get(handlers::submissions::get_submission)
                .delete(handlers::submissions::delete_submission),
        )
        .route(
            &format!("{}/submissions/{{submission_id}}/status", API_PREFIX),
            put(handlers::submissions::update_submission_status),
        )
}
