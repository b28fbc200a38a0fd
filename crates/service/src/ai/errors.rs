use thiserror::Error;

/// Errors raised while proposing, confirming or executing an action.
///
/// Handler failures (`Invalid`, `Missing`, `Unauthorized`, `NoExecutor`) end
/// up verbatim in the row's `error_message`.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action not found or doesn't require confirmation")]
    NotFound,
    #[error("Action has already been processed")]
    AlreadyProcessed,
    #[error("No executor for action type: {0}")]
    NoExecutor(String),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Missing(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("storage error: {0}")]
    Store(String),
}

impl ActionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

impl From<models::errors::ModelError> for ActionError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(m) => ActionError::Invalid(m),
            models::errors::ModelError::Db(m) => ActionError::Store(m),
        }
    }
}

impl From<sea_orm::DbErr> for ActionError {
    fn from(e: sea_orm::DbErr) -> Self {
        ActionError::Store(e.to_string())
    }
}
