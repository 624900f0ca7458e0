use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated caller, stored in request extensions by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

impl From<JwtClaims> for AuthUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}

// Extension cannot be combined with Multipart, so read the extensions directly
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Authentication required".to_string(),
                    details: None,
                    error_type: None,
                    code: "MISSING_USER_CONTEXT".to_string(),
                    recoverable: false,
                    suggested_action: Some("Send a bearer token".to_string()),
                }),
            )
        })
    }
}
