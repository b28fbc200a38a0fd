use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }
    pub fn db(e: impl std::fmt::Display) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Db(e.to_string())
    }
}

impl From<crate::currency::CurrencyError> for ServiceError {
    fn from(e: crate::currency::CurrencyError) -> Self {
        use crate::currency::CurrencyError;
        match e {
            CurrencyError::Db(m) => ServiceError::Db(m),
            CurrencyError::NotFound(m) => ServiceError::NotFound(m),
            other => ServiceError::Validation(other.to_string()),
        }
    }
}
