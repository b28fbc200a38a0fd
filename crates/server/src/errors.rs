use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::ai::ActionError;
use service::auth::errors::AuthError;
use service::currency::CurrencyError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Error body shared by every handler: `{"error": <reason>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: Option<String>) -> Self {
        Self { status, error: error.into(), message }
    }

    /// Reason phrase of `status` as the error, `msg` as the message.
    pub fn status(status: StatusCode, msg: impl Into<String>) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Error"), Some(msg.into()))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, msg)
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::status(StatusCode::UNAUTHORIZED, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::status(StatusCode::FORBIDDEN, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::status(StatusCode::NOT_FOUND, msg)
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.error, message = ?self.message, "request failed");
        } else {
            warn!(status = self.status.as_u16(), error = %self.error, message = ?self.message, "request rejected");
        }
        let body = serde_json::json!({ "error": self.error, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        use models::errors::ModelError;
        match e {
            ServiceError::Validation(m) => Self::bad_request(m),
            ServiceError::NotFound(m) => Self::not_found(m),
            ServiceError::Forbidden(m) => Self::forbidden(m),
            ServiceError::Conflict(m) => Self::status(StatusCode::CONFLICT, m),
            ServiceError::Model(ModelError::Validation(m)) => Self::bad_request(m),
            ServiceError::Db(m) | ServiceError::Model(ModelError::Db(m)) => Self::internal(m),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let msg = e.to_string();
        match e {
            AuthError::Validation(m) => Self::bad_request(m),
            AuthError::Conflict => Self::status(StatusCode::CONFLICT, "User with this email already exists"),
            AuthError::NotFound => Self::not_found(msg),
            AuthError::Unauthorized | AuthError::TokenExpired | AuthError::TokenError(_) => Self::unauthorized(msg),
            AuthError::HashError(_) | AuthError::Repository(_) => Self::internal(msg),
        }
    }
}

impl From<CurrencyError> for JsonApiError {
    fn from(e: CurrencyError) -> Self {
        let msg = e.to_string();
        let status = match e {
            CurrencyError::UnknownCurrency(_) | CurrencyError::Validation(_) => StatusCode::BAD_REQUEST,
            CurrencyError::NotFound(_) | CurrencyError::MissingLocalRate { .. } => StatusCode::NOT_FOUND,
            CurrencyError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            CurrencyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CurrencyError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            CurrencyError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::status(status, msg)
    }
}

impl From<ActionError> for JsonApiError {
    fn from(e: ActionError) -> Self {
        let msg = e.to_string();
        let status = match e {
            ActionError::NotFound => StatusCode::NOT_FOUND,
            ActionError::AlreadyProcessed
            | ActionError::NoExecutor(_)
            | ActionError::Invalid(_)
            | ActionError::Missing(_) => StatusCode::BAD_REQUEST,
            ActionError::Unauthorized(_) => StatusCode::FORBIDDEN,
            ActionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::status(status, msg)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("currency client: {0}")]
    Currency(#[from] CurrencyError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_service_errors_to_status() {
        assert_eq!(JsonApiError::from(ServiceError::Conflict("dup".into())).status, StatusCode::CONFLICT);
        assert_eq!(JsonApiError::from(ServiceError::Forbidden("no".into())).status, StatusCode::FORBIDDEN);
        let e = JsonApiError::from(ServiceError::Validation("Quantity must be greater than zero".into()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.error, "Bad Request");
        assert_eq!(e.message.as_deref(), Some("Quantity must be greater than zero"));
    }

    #[test]
    fn maps_currency_and_action_errors() {
        assert_eq!(JsonApiError::from(CurrencyError::RateLimited("USD_EUR".into())).status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(JsonApiError::from(CurrencyError::Upstream("down".into())).status, StatusCode::BAD_GATEWAY);
        assert_eq!(JsonApiError::from(CurrencyError::NotConfigured).status, StatusCode::SERVICE_UNAVAILABLE);
        let e = JsonApiError::from(ActionError::AlreadyProcessed);
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.message.as_deref(), Some("Action has already been processed"));
        assert_eq!(JsonApiError::from(ActionError::NotFound).status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_conflict_is_409() {
        assert_eq!(JsonApiError::from(AuthError::Conflict).status, StatusCode::CONFLICT);
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
    }
}
