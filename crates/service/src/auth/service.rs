use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use models::enums::UserRole;
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};
use uuid::Uuid;

use super::domain::{validate_password, RegisterInput, LoginInput, AuthUser, AuthSession};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token::{self, Claims};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
    pub token_ttl_days: i64,
}

impl AuthConfig {
    pub fn from_settings(cfg: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: Some(cfg.jwt_secret.clone()),
            password_algorithm: "argon2".into(),
            token_ttl_days: cfg.token_ttl_days,
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: None, password_algorithm: "argon2".into(), token_ttl_days: 30 });
    /// let input = RegisterInput { email: "user@example.com".into(), full_name: "Test".into(), phone_number: None, password: "Secret123".into(), role: None };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        validate_password(&input.password).map_err(AuthError::Validation)?;
        let role = input.role.unwrap_or(UserRole::Attendee);
        if role == UserRole::Admin {
            return Err(AuthError::Validation("ADMIN role cannot be self-assigned".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&input.email, &input.full_name, input.phone_number, role).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, role = ?user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a bearer token when a secret is configured.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), password_algorithm: "argon2".into(), token_ttl_days: 30 });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), full_name: "N".into(), phone_number: None, password: "Passw0rd".into(), role: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = match &self.cfg.jwt_secret {
            Some(secret) => Some(token::issue(secret, &user, self.cfg.token_ttl_days)?),
            None => None,
        };
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Current user behind verified claims.
    pub async fn me(&self, claims: &Claims) -> Result<AuthUser, AuthError> {
        let id: Uuid = claims.user_id()?;
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: Some("secret".into()), password_algorithm: "argon2".into(), token_ttl_days: 30 },
        )
    }

    fn reg(email: &str, password: &str, role: Option<UserRole>) -> RegisterInput {
        RegisterInput { email: email.into(), full_name: "Test".into(), phone_number: None, password: password.into(), role }
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let err = svc().register(reg("a@b.co", "12345678", None)).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn register_rejects_admin_and_duplicates() {
        let s = svc();
        assert!(matches!(s.register(reg("a@b.co", "Passw0rd", Some(UserRole::Admin))).await, Err(AuthError::Validation(_))));
        s.register(reg("a@b.co", "Passw0rd", Some(UserRole::Organizer))).await.unwrap();
        assert!(matches!(s.register(reg("A@b.co", "Passw0rd", None)).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_issues_token_with_role() {
        let s = svc();
        s.register(reg("org@b.co", "Passw0rd", Some(UserRole::Organizer))).await.unwrap();
        let session = s.login(LoginInput { email: "org@b.co".into(), password: "Passw0rd".into() }).await.unwrap();
        let claims = token::verify("secret", session.token.as_deref().unwrap()).unwrap();
        assert_eq!(claims.role, UserRole::Organizer);
        assert_eq!(s.me(&claims).await.unwrap().email, "org@b.co");
    }

    #[tokio::test]
    async fn login_wrong_password_unauthorized() {
        let s = svc();
        s.register(reg("x@b.co", "Passw0rd", None)).await.unwrap();
        let err = s.login(LoginInput { email: "x@b.co".into(), password: "nope1234".into() }).await.unwrap_err();
        assert_eq!(err.code(), 1004);
    }
}
