//! AI form generation handlers

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::load_owned_form;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use formwright_core::models::{
    FieldDefinition, FormSettings, GenerateFormRequest, NewForm, RegenerateFormRequest,
};
use formwright_core::AppError;
use formwright_services::{generate_schema, regenerate_schema};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedForm {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub public_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateFormResponse {
    pub message: String,
    pub form: GeneratedForm,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegeneratedForm {
    pub id: Uuid,
    pub title: String,
    pub fields: Vec<FieldDefinition>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegenerateFormResponse {
    pub message: String,
    pub form: RegeneratedForm,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    post,
    path = "/api/v0/ai/generate-form",
    tag = "ai",
    request_body = GenerateFormRequest,
    responses(
        (status = 201, description = "Form generated", body = GenerateFormResponse),
        (status = 400, description = "Missing prompt", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Generated schema was malformed", body = ErrorResponse),
        (status = 502, description = "AI service failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = %user.id))]
pub async fn generate_form(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<GenerateFormRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide a prompt for form generation".to_string(),
        )
        .into());
    }

    let mut schema = generate_schema(state.ai.generator.as_ref(), prompt).await?;

    let title = non_blank(request.title);
    let description = non_blank(request.description);
    if title.is_some() || description.is_some() {
        let title = title.unwrap_or_else(|| schema.title().to_string());
        let description = description.or_else(|| schema.description().map(String::from));
        schema = schema.retitled(title, description)?;
    }

    let form = state
        .db
        .form_repository
        .create(NewForm {
            title: schema.title().to_string(),
            description: schema.description().map(String::from),
            prompt: prompt.to_string(),
            schema,
            creator_id: user.id,
            creator_name: user.name.clone(),
            settings: FormSettings::default(),
        })
        .await?;

    tracing::info!(form_id = %form.id, field_count = form.fields.len(), "Form generated");

    Ok((
        StatusCode::CREATED,
        Json(GenerateFormResponse {
            message: "Form generated successfully".to_string(),
            form: GeneratedForm {
                id: form.id,
                title: form.title,
                description: form.description,
                fields: form.fields,
                public_id: form.public_id,
                created_at: form.created_at,
            },
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v0/ai/regenerate-form/{form_id}",
    tag = "ai",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    request_body = RegenerateFormRequest,
    responses(
        (status = 200, description = "Form fields regenerated", body = RegenerateFormResponse),
        (status = 400, description = "Missing prompt", body = ErrorResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse),
        (status = 502, description = "AI service failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = %user.id, form_id = %form_id))]
pub async fn regenerate_form(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(form_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RegenerateFormRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(
            AppError::BadRequest("Please provide a prompt for regeneration".to_string()).into(),
        );
    }

    let form = load_owned_form(&state, form_id, &user).await?;

    let schema = regenerate_schema(
        state.ai.generator.as_ref(),
        &form,
        prompt,
        request.modifications.as_deref(),
    )
    .await?;

    let form = state
        .db
        .form_repository
        .replace_fields(form_id, schema, prompt)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    Ok(Json(RegenerateFormResponse {
        message: "Form regenerated successfully".to_string(),
        form: RegeneratedForm {
            id: form.id,
            title: form.title,
            fields: form.fields,
            updated_at: form.updated_at,
        },
    }))
}
