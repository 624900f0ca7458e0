//! HS256 bearer token verification

use crate::auth::models::{AuthUser, JwtClaims};
use formwright_core::AppError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".to_string()),
                _ => AppError::Unauthorized("Invalid token".to_string()),
            },
        )?;

        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn token(secret: &str, exp_offset: i64) -> (Uuid, String) {
        let id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: id,
            name: "Grace".to_string(),
            email: Some("grace@example.com".to_string()),
            exp: now + exp_offset,
            iat: now,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (id, token)
    }

    #[test]
    fn test_verify_valid_token() {
        let (id, token) = token(SECRET, 3600);
        let user = JwtService::new(SECRET).verify(&token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Grace");
        assert_eq!(user.email.as_deref(), Some("grace@example.com"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let (_, token) = token("another-secret-another-secret-xx", 3600);
        let err = JwtService::new(SECRET).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Invalid token"));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let (_, token) = token(SECRET, -3600);
        let err = JwtService::new(SECRET).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token expired"));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(JwtService::new(SECRET).verify("not-a-token").is_err());
    }
}
