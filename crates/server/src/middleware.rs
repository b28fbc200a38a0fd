use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use models::enums::{ParseLoose, UserRole};
use models::user;
use sea_orm::{DatabaseConnection, EntityTrait};
use service::auth::{token, Claims};

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Requests that pass without a token.
fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS {
        return true;
    }
    if matches!(path, "/health" | "/metrics" | "/auth/login" | "/auth/register" | "/auth/logout")
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
    {
        return true;
    }
    method == Method::GET
        && (path == "/events"
            || (path.starts_with("/events/") && !path.ends_with("/collaborations"))
            || path == "/categories"
            || path == "/ticket-types"
            || path.starts_with("/ticket-types/")
            || path == "/currency/list"
            || path == "/currency/latest"
            || path.starts_with("/currency/convert/"))
}

fn cookie_token(req: &Request) -> Option<String> {
    CookieJar::from_headers(req.headers())
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Verifies `Authorization: Bearer <token>`, falling back to the `auth_token`
/// cookie, and stores the [`Claims`] in the request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let public = is_public(req.method(), &path);

    let header_token = match req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => Some(t.trim().to_string()),
            None if public => None,
            None => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::unauthorized("Invalid authorization header"));
            }
        },
        None => None,
    };
    let Some(tok) = header_token.or_else(|| cookie_token(&req)) else {
        if public {
            return Ok(next.run(req).await);
        }
        tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("Authentication required"));
    };

    match token::verify(&state.jwt_secret, &tok) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(_) if public => Ok(next.run(req).await),
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(JsonApiError::unauthorized("Invalid or expired token"))
        }
    }
}

/// The caller's user row.
pub async fn current_user(
    db: &DatabaseConnection,
    claims: &Claims,
) -> Result<user::Model, JsonApiError> {
    let id = claims.user_id()?;
    user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| JsonApiError::internal(e.to_string()))?
        .ok_or_else(|| JsonApiError::unauthorized("User no longer exists"))
}

pub fn require_role(claims: &Claims, role: UserRole) -> Result<(), JsonApiError> {
    if claims.is(role) {
        Ok(())
    } else {
        Err(JsonApiError::forbidden(format!("{} role required", role.as_db_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        assert!(is_public(&Method::GET, "/events"));
        assert!(is_public(&Method::GET, "/events/1b4e28ba-2fa1-11d2-883f-0016d3cca427"));
        assert!(!is_public(&Method::POST, "/events"));
        assert!(!is_public(&Method::GET, "/tickets"));
        assert!(!is_public(&Method::GET, "/currency/revenue/convert"));
        assert!(!is_public(&Method::GET, "/events/1b4e28ba-2fa1-11d2-883f-0016d3cca427/collaborations"));
        assert!(!is_public(&Method::GET, "/currency/historical/2024-05-01"));
        assert!(is_public(&Method::OPTIONS, "/tickets"));
        assert!(is_public(&Method::POST, "/auth/login"));
    }

    #[test]
    fn reads_cookie_token() {
        let req = Request::builder()
            .header(header::COOKIE, "theme=dark; auth_token=abc.def")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(cookie_token(&req).as_deref(), Some("abc.def"));

        let empty = Request::builder()
            .header(header::COOKIE, "auth_token=")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(cookie_token(&empty), None);
    }
}
