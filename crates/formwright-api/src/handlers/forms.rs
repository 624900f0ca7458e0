//! Form management handlers

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::{load_owned_form, paging};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use formwright_core::models::{
    total_pages, DuplicateFormRequest, Form, FormAnalytics, FormListQuery, FormListResponse,
    FormSummary, PublicForm, UpdateFormRequest,
};
use formwright_core::AppError;
use formwright_db::FormUpdate;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct FormResponse {
    pub form: Form,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicFormResponse {
    pub form: PublicForm,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateFormResponse {
    pub message: String,
    pub form: Form,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DuplicateFormResponse {
    pub message: String,
    pub form: FormSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    pub analytics: FormAnalytics,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// JSON body that may be left out entirely
fn parse_optional_body(body: &[u8]) -> Result<DuplicateFormRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DuplicateFormRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid request body: {}", e)))
}

#[utoipa::path(
    get,
    path = "/api/v0/forms/my-forms",
    tag = "forms",
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Forms per page (default 10)"),
        ("search" = Option<String>, Query, description = "Case-insensitive title/description filter")
    ),
    responses(
        (status = 200, description = "Caller's forms, newest first", body = FormListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id))]
pub async fn list_my_forms(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<FormListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (page, limit) = paging(query.page, query.limit);

    let result = state
        .db
        .form_repository
        .list_by_creator(user.id, page, limit, &query.search)
        .await?;

    Ok(Json(FormListResponse {
        total_pages: total_pages(result.total, limit),
        current_page: page,
        total: result.total,
        forms: result.forms,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v0/forms/{form_id}",
    tag = "forms",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Full form", body = FormResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, form_id = %form_id))]
pub async fn get_form(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = load_owned_form(&state, form_id, &user).await?;
    Ok(Json(FormResponse { form }))
}

#[utoipa::path(
    get,
    path = "/api/v0/forms/public/{public_id}",
    tag = "forms",
    params(("public_id" = String, Path, description = "Shareable form identifier")),
    responses(
        (status = 200, description = "Form as shown to respondents", body = PublicFormResponse),
        (status = 403, description = "Form is not public", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_public_form(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = state
        .db
        .form_repository
        .get_by_public_id(&public_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    if !form.is_public {
        return Err(AppError::Forbidden("This form is not public".to_string()).into());
    }

    Ok(Json(PublicFormResponse { form: form.into() }))
}

#[utoipa::path(
    put,
    path = "/api/v0/forms/{form_id}",
    tag = "forms",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    request_body = UpdateFormRequest,
    responses(
        (status = 200, description = "Form updated", body = UpdateFormResponse),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = %user.id, form_id = %form_id))]
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(form_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateFormRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_owned_form(&state, form_id, &user).await?;

    let title = match request.title {
        Some(title) if title.trim().is_empty() => {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()).into());
        }
        Some(title) => Some(title.trim().to_string()),
        None => None,
    };

    let form = state
        .db
        .form_repository
        .update_settings(
            form_id,
            FormUpdate {
                title,
                description: request
                    .description
                    .map(|d| d.filter(|d| !d.trim().is_empty())),
                is_public: request.is_public,
                allow_multiple_submissions: request.allow_multiple_submissions,
                settings: request.settings,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    Ok(Json(UpdateFormResponse {
        message: "Form updated successfully".to_string(),
        form,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v0/forms/{form_id}",
    tag = "forms",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form and its submissions deleted", body = MessageResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, form_id = %form_id))]
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_owned_form(&state, form_id, &user).await?;

    if !state.db.form_repository.delete(form_id).await? {
        return Err(AppError::NotFound("Form not found".to_string()).into());
    }

    tracing::info!(form_id = %form_id, "Form deleted");

    Ok(Json(MessageResponse {
        message: "Form and all submissions deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v0/forms/{form_id}/duplicate",
    tag = "forms",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    request_body = DuplicateFormRequest,
    responses(
        (status = 201, description = "Copy created", body = DuplicateFormResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body), fields(user_id = %user.id, form_id = %form_id))]
pub async fn duplicate_form(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(form_id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let original = load_owned_form(&state, form_id, &user).await?;
    let request = parse_optional_body(&body)?;

    let copy = state
        .db
        .form_repository
        .duplicate(
            &original,
            user.id,
            &user.name,
            request.title,
            request.description,
        )
        .await?;

    tracing::info!(form_id = %form_id, copy_id = %copy.id, "Form duplicated");

    Ok((
        StatusCode::CREATED,
        Json(DuplicateFormResponse {
            message: "Form duplicated successfully".to_string(),
            form: FormSummary::from(&copy),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v0/forms/{form_id}/analytics",
    tag = "forms",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Submission statistics", body = AnalyticsResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, form_id = %form_id))]
pub async fn form_analytics(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = load_owned_form(&state, form_id, &user).await?;
    let analytics = state.db.form_repository.analytics(&form).await?;
    Ok(Json(AnalyticsResponse { analytics }))
}
