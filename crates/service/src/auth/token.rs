//! HS256 bearer tokens carrying the user id, email and role.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use models::enums::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    pub fn is(&self, role: UserRole) -> bool {
        self.role == role
    }
}

pub fn issue(secret: &str, user: &AuthUser, ttl_days: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(ttl_days)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

pub fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenError(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: "o@example.com".into(), full_name: "O".into(), role: UserRole::Organizer }
    }

    #[test]
    fn issued_token_verifies() {
        let u = user();
        let t = issue("s3cret", &u, 30).unwrap();
        let c = verify("s3cret", &t).unwrap();
        assert_eq!(c.user_id().unwrap(), u.id);
        assert!(c.is(UserRole::Organizer));
        assert!(c.exp - c.iat >= 30 * 24 * 3600 - 1);
    }

    #[test]
    fn wrong_secret_rejected() {
        let t = issue("a", &user(), 1).unwrap();
        assert!(matches!(verify("b", &t), Err(AuthError::TokenError(_))));
    }

    #[test]
    fn expired_token_reported() {
        let t = issue("a", &user(), -2).unwrap();
        assert!(matches!(verify("a", &t), Err(AuthError::TokenExpired)));
    }
}
