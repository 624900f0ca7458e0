//! Submission handlers
//!
//! Respondents post multipart submissions to a public form; creators list,
//! review and delete them.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::forms::MessageResponse;
use crate::handlers::{load_owned_form, paging};
use crate::state::AppState;
use crate::utils::ip_extraction::ClientInfo;
use crate::utils::upload::read_submission_parts;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use formwright_core::models::{
    total_pages, Submission, SubmissionListQuery, SubmissionListResponse,
    SubmissionStatusResponse, SubmitResponse, UpdateSubmissionStatusRequest,
};
use formwright_core::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub submission: Submission,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub message: String,
    pub submission: SubmissionStatusResponse,
}

/// Load a submission whose form the caller owns
async fn load_owned_submission(
    state: &AppState,
    submission_id: Uuid,
    user: &AuthUser,
) -> Result<Submission, HttpAppError> {
    let submission = state
        .db
        .submission_repository
        .get(submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    let owned = state
        .db
        .form_repository
        .get(submission.form_id)
        .await?
        .is_some_and(|form| form.is_owned_by(user.id));

    if !owned {
        return Err(AppError::Forbidden("Access denied".to_string()).into());
    }

    Ok(submission)
}

#[utoipa::path(
    post,
    path = "/api/v0/submissions/submit/{public_id}",
    tag = "submissions",
    params(("public_id" = String, Path, description = "Shareable form identifier")),
    request_body(
        content_type = "multipart/form-data",
        description = "`responses`: JSON array of {fieldName, value}; `files`: uploaded files; `fileFields`: field name per file, in the same order"
    ),
    responses(
        (status = 201, description = "Submission stored", body = SubmitResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Form is not public", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "File upload failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, client, multipart))]
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<String>,
    ClientInfo(client): ClientInfo,
    multipart: Multipart,
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

    let parts = read_submission_parts(multipart).await?;
    let (entries, files) = parts.into_submission(&state.media.upload_filter)?;

    let schema = form.schema()?;
    let record = state
        .media
        .assembler
        .validate_and_assemble(&schema, form.id, entries, &files)
        .await?;

    let submission = state
        .db
        .submission_repository
        .create_with_counter(form.id, record, client)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Form submitted successfully".to_string(),
            submission_id: submission.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v0/submissions/form/{form_id}",
    tag = "submissions",
    params(
        ("form_id" = Uuid, Path, description = "Form ID"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Submissions per page (default 20)"),
        ("status" = Option<String>, Query, description = "pending, approved or rejected")
    ),
    responses(
        (status = 200, description = "Newest submissions first", body = SubmissionListResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, form_id = %form_id))]
pub async fn list_form_submissions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(form_id): Path<Uuid>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_owned_form(&state, form_id, &user).await?;

    let (page, limit) = paging(query.page, query.limit);
    let result = state
        .db
        .submission_repository
        .list_by_form(form_id, page, limit, query.status)
        .await?;

    Ok(Json(SubmissionListResponse {
        total_pages: total_pages(result.total, limit),
        current_page: page,
        total: result.total,
        submissions: result.submissions,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v0/submissions/{submission_id}",
    tag = "submissions",
    params(("submission_id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission", body = SubmissionResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, submission_id = %submission_id))]
pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let submission = load_owned_submission(&state, submission_id, &user).await?;
    Ok(Json(SubmissionResponse { submission }))
}

#[utoipa::path(
    put,
    path = "/api/v0/submissions/{submission_id}/status",
    tag = "submissions",
    params(("submission_id" = Uuid, Path, description = "Submission ID")),
    request_body = UpdateSubmissionStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = %user.id, submission_id = %submission_id))]
pub async fn update_submission_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(submission_id): Path<Uuid>,
    request: Result<Json<UpdateSubmissionStatusRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(request) = request?;
    load_owned_submission(&state, submission_id, &user).await?;

    let submission = state
        .db
        .submission_repository
        .update_status(submission_id, request.status, request.notes)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    tracing::info!(submission_id = %submission_id, status = %submission.status, "Submission reviewed");

    Ok(Json(UpdateStatusResponse {
        message: "Submission status updated successfully".to_string(),
        submission: SubmissionStatusResponse {
            id: submission.id,
            status: submission.status,
            notes: submission.notes,
            updated_at: submission.updated_at,
        },
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v0/submissions/{submission_id}",
    tag = "submissions",
    params(("submission_id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission and its files deleted", body = MessageResponse),
        (status = 403, description = "Not the form owner", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, submission_id = %submission_id))]
pub async fn delete_submission(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    load_owned_submission(&state, submission_id, &user).await?;

    let submission = state
        .db
        .submission_repository
        .delete(submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    // The row is gone either way; orphaned objects are only logged
    for key in submission.storage_keys() {
        if let Err(e) = state.media.storage.delete(key).await {
            tracing::warn!(error = %e, storage_key = %key, "Failed to delete submission file");
        }
    }

    Ok(Json(MessageResponse {
        message: "Submission deleted successfully".to_string(),
    }))
}
