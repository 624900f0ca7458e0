use crate::auth::jwt::JwtService;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use formwright_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
}

/// Bearer token from an `Authorization` header value
pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    let Some(header) = header else {
        return HttpAppError(AppError::Unauthorized(
            "Missing authorization header".to_string(),
        ))
        .into_response();
    };

    let Some(token) = bearer_token(header) else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        ))
        .into_response();
    };

    match auth_state.jwt.verify(token) {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
