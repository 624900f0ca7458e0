use chrono::{Duration, Utc};
use formwright_api::auth::JwtClaims;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

/// Signing secret shared with `create_test_config`
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// A form creator with a valid bearer token
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub token: String,
}

impl TestUser {
    pub fn new(name: &str) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let claims = JwtClaims {
            sub: id,
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign test token");

        Self {
            id,
            name: name.to_string(),
            token,
        }
    }
}
