use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurrencyError {
    #[error("Currency '{0}' not found in system")]
    UnknownCurrency(String),
    #[error("rate lookups for {0} are limited; retry in a few seconds")]
    RateLimited(String),
    #[error("exchange rate API error: {0}")]
    Upstream(String),
    #[error("exchange rate API key is not configured")]
    NotConfigured,
    #[error("No exchange rate found for {from} to {to}")]
    MissingLocalRate { from: String, to: String },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<common::UpstreamError> for CurrencyError {
    fn from(e: common::UpstreamError) -> Self {
        CurrencyError::Upstream(e.to_string())
    }
}

impl From<models::errors::ModelError> for CurrencyError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(m) => CurrencyError::Validation(m),
            models::errors::ModelError::Db(m) => CurrencyError::Db(m),
        }
    }
}

impl From<sea_orm::DbErr> for CurrencyError {
    fn from(e: sea_orm::DbErr) -> Self {
        CurrencyError::Db(e.to_string())
    }
}
