pub mod ai;
pub mod forms;
pub mod health;
pub mod submissions;

use crate::auth::AuthUser;
use crate::constants::MAX_PAGE_LIMIT;
use crate::error::HttpAppError;
use crate::state::AppState;
use formwright_core::models::Form;
use formwright_core::AppError;
use uuid::Uuid;

/// Load a form the caller owns: 404 if missing, 403 if someone else's
pub(crate) async fn load_owned_form(
    state: &AppState,
    form_id: Uuid,
    user: &AuthUser,
) -> Result<Form, HttpAppError> {
    let form = state
        .db
        .form_repository
        .get(form_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    if !form.is_owned_by(user.id) {
        tracing::debug!(form_id = %form_id, user_id = %user.id, "Form access denied");
        return Err(AppError::Forbidden("Access denied".to_string()).into());
    }

    Ok(form)
}

/// Page number starting at 1 and a limit within `1..=MAX_PAGE_LIMIT`
pub(crate) fn paging(page: u32, limit: u32) -> (u32, u32) {
    (page.max(1), limit.clamp(1, MAX_PAGE_LIMIT))
}
