use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::evening::repository::EveningRepository;
use crate::stats::{StatsError, StatsService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub evening_repository: Arc<dyn EveningRepository + Send + Sync>,
    pub stats_service: Arc<StatsService>,
}

impl AppState {
    pub fn new(
        evening_repository: Arc<dyn EveningRepository + Send + Sync>,
        stats_service: Arc<StatsService>,
    ) -> Self {
        Self {
            evening_repository,
            stats_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A year rebuild failed after the evening itself was updated
    #[error("Statistics update failed: {0}")]
    StatsUpdateFailed(String),
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::NotFound(msg) => AppError::NotFound(msg),
            StatsError::Repository(msg) | StatsError::EveningStore(msg) => {
                AppError::DatabaseError(msg)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::StatsUpdateFailed(msg) => {
                error!(error = %msg, "Statistics update failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Statistics update failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::evening::repository::InMemoryEveningRepository;
    use crate::stats::{InMemoryUserStatRepository, UserStatRepository};

    /// Builder for creating AppState backed by in-memory stores
    pub struct AppStateBuilder {
        evening_repository: Option<Arc<dyn EveningRepository + Send + Sync>>,
        user_stat_repository: Option<Arc<dyn UserStatRepository>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                evening_repository: None,
                user_stat_repository: None,
            }
        }

        pub fn with_evening_repository(
            mut self,
            repo: Arc<dyn EveningRepository + Send + Sync>,
        ) -> Self {
            self.evening_repository = Some(repo);
            self
        }

        pub fn with_user_stat_repository(mut self, repo: Arc<dyn UserStatRepository>) -> Self {
            self.user_stat_repository = Some(repo);
            self
        }

        pub fn build(self) -> AppState {
            let evening_repository = self
                .evening_repository
                .unwrap_or_else(|| Arc::new(InMemoryEveningRepository::new()));
            let user_stat_repository = self
                .user_stat_repository
                .unwrap_or_else(|| Arc::new(InMemoryUserStatRepository::new()));
            let stats_service = Arc::new(StatsService::new(
                evening_repository.clone(),
                user_stat_repository,
            ));

            AppState::new(evening_repository, stats_service)
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    pub async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
