//! OpenAPI documentation.
//! API version is in `crate::constants::API_VERSION`.
//! Paths in handler annotations use placeholder /api/v0; they are transformed at runtime to the actual version.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::API_VERSION;
use crate::error;
use crate::handlers;
use formwright_core::models;

/// Placeholder version used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PATH_PLACEHOLDER: &str = "/api/v0";

fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, version: &str) {
    let replacement = format!("/api/{}", version);
    if OPENAPI_PATH_PLACEHOLDER == replacement {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(OPENAPI_PATH_PLACEHOLDER, &replacement, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with path placeholders replaced by the current API version.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, API_VERSION);
    spec
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Formwright API",
        version = "0.1.0",
        description = "AI-generated forms (v0): generate a form schema from a prompt, share it publicly, and collect validated submissions with file uploads. All endpoints are versioned under /api/v0/."
    ),
    paths(
        // AI
        handlers::ai::generate_form,
        handlers::ai::regenerate_form,
        // Forms
        handlers::forms::list_my_forms,
        handlers::forms::get_form,
        handlers::forms::get_public_form,
        handlers::forms::update_form,
        handlers::forms::delete_form,
        handlers::forms::duplicate_form,
        handlers::forms::form_analytics,
        // Submissions
        handlers::submissions::submit_form,
        handlers::submissions::list_form_submissions,
        handlers::submissions::get_submission,
        handlers::submissions::update_submission_status,
        handlers::submissions::delete_submission,
        // Health
        handlers::health::liveness_check,
        handlers::health::readiness_check,
    ),
    components(
        schemas(
            // Schema models
            models::FieldType,
            models::FieldValidation,
            models::FileConfig,
            models::FieldDefinition,
            models::FormSchema,
            // Form models
            models::FormTheme,
            models::FormSettings,
            models::FormSettingsPatch,
            models::Form,
            models::PublicForm,
            models::FormSummary,
            models::FormListResponse,
            models::FieldStat,
            models::FormAnalytics,
            models::GenerateFormRequest,
            models::RegenerateFormRequest,
            models::UpdateFormRequest,
            models::DuplicateFormRequest,
            // Submission models
            models::RawSubmissionEntry,
            models::SubmissionStatus,
            models::FieldResponse,
            models::SubmitterInfo,
            models::Submission,
            models::UpdateSubmissionStatusRequest,
            models::SubmissionStatusResponse,
            models::SubmissionListResponse,
            models::SubmitResponse,
            // Responses
            handlers::ai::GeneratedForm,
            handlers::ai::GenerateFormResponse,
            handlers::ai::RegeneratedForm,
            handlers::ai::RegenerateFormResponse,
            handlers::forms::FormResponse,
            handlers::forms::PublicFormResponse,
            handlers::forms::UpdateFormResponse,
            handlers::forms::DuplicateFormResponse,
            handlers::forms::AnalyticsResponse,
            handlers::forms::MessageResponse,
            handlers::submissions::SubmissionResponse,
            handlers::submissions::UpdateStatusResponse,
            handlers::health::HealthCheckResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "ai", description = "Form generation and regeneration from natural-language prompts"),
        (name = "forms", description = "Form management for creators and public form rendering"),
        (name = "submissions", description = "Public submission intake and creator review"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;
