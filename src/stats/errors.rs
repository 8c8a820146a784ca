use thiserror::Error;

use crate::shared::AppError;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Evening store error: {0}")]
    EveningStore(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<AppError> for StatsError {
    fn from(err: AppError) -> Self {
        StatsError::EveningStore(err.to_string())
    }
}

impl From<sqlx::Error> for StatsError {
    fn from(err: sqlx::Error) -> Self {
        StatsError::Repository(err.to_string())
    }
}
