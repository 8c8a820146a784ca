use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::{
    calculator::{find_oversized_score, MAX_SCORE_POINTS},
    models::{Evening, EveningStatus, PlayedGame},
    repository::EveningRepository,
    types::{CreateEveningRequest, StatusChangeResponse},
};
use crate::{shared::AppError, stats::StatsService};

/// Service for the evening lifecycle and the statistics triggers hanging off it
pub struct EveningService {
    repository: Arc<dyn EveningRepository + Send + Sync>,
    stats_service: Arc<StatsService>,
}

impl EveningService {
    pub fn new(
        repository: Arc<dyn EveningRepository + Send + Sync>,
        stats_service: Arc<StatsService>,
    ) -> Self {
        Self {
            repository,
            stats_service,
        }
    }

    /// Creates a new open evening with a generated ID
    #[instrument(skip(self, request), fields(year = request.year))]
    pub async fn create_evening(&self, request: CreateEveningRequest) -> Result<Evening, AppError> {
        if request.participant_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(AppError::BadRequest(
                "Participant IDs must not be empty".to_string(),
            ));
        }
        validate_scores(&request.games)?;

        let mut evening = Evening::new(request.year, request.participant_ids);
        evening.date = request.date;
        evening.host_id = request.host_id;
        evening.organizer_id = request.organizer_id;
        evening.games = request.games;
        debug!(evening_id = %evening.id, "Generated evening ID");

        self.repository.create_evening(&evening).await?;

        info!(
            evening_id = %evening.id,
            participants = evening.participant_ids.len(),
            "Evening created successfully"
        );
        Ok(evening)
    }

    #[instrument(skip(self))]
    pub async fn get_evening(&self, evening_id: &str) -> Result<Evening, AppError> {
        self.repository
            .get_evening(evening_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Evening {} not found", evening_id)))
    }

    /// Replaces the recorded games. The cached results stay as they are until
    /// the evening is finalized or recalculated.
    #[instrument(skip(self, games), fields(games = games.len()))]
    pub async fn update_games(
        &self,
        evening_id: &str,
        games: Vec<PlayedGame>,
    ) -> Result<Evening, AppError> {
        validate_scores(&games)?;
        let mut evening = self.get_evening(evening_id).await?;
        if evening.status == EveningStatus::Archived {
            return Err(AppError::Conflict(format!(
                "Evening {} is archived",
                evening_id
            )));
        }

        evening.games = games;
        self.repository.update_evening(&evening).await?;

        debug!(evening_id = %evening.id, "Games updated");
        Ok(evening)
    }

    /// Moves an evening to `next`.
    ///
    /// Entering `finalized` from an open state computes and stores the
    /// evening's results before the status is persisted. Whenever the move
    /// adds the evening to, or removes it from, the completed set the
    /// evening's year is rebuilt afterwards.
    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        evening_id: &str,
        next: EveningStatus,
    ) -> Result<StatusChangeResponse, AppError> {
        let mut evening = self.get_evening(evening_id).await?;
        let previous = evening.status;

        if previous == next {
            debug!(evening_id, status = %next, "Status unchanged");
            return Ok(StatusChangeResponse {
                evening_id: evening.id,
                previous_status: previous,
                status: next,
                rebuilt_rows: None,
            });
        }

        if !previous.can_transition_to(next) {
            warn!(evening_id, from = %previous, to = %next, "Rejected status change");
            return Err(AppError::Conflict(format!(
                "Cannot change status from {} to {}",
                previous, next
            )));
        }

        if next == EveningStatus::Finalized && !previous.is_completed() {
            let stats = evening.refresh_stats();
            debug!(
                evening_id,
                winners = ?stats.winner_ids,
                total_points = stats.total_points,
                "Evening results computed"
            );
        }

        evening.status = next;
        self.repository.update_evening(&evening).await?;

        let rebuilt_rows = if previous.is_completed() != next.is_completed() {
            Some(self.rebuild_year(evening.year).await?)
        } else {
            None
        };

        info!(
            evening_id,
            from = %previous,
            to = %next,
            ?rebuilt_rows,
            "Evening status changed"
        );
        Ok(StatusChangeResponse {
            evening_id: evening.id,
            previous_status: previous,
            status: next,
            rebuilt_rows,
        })
    }

    /// Finalizes an evening: results first, then status, then the year rebuild
    pub async fn on_evening_finalized(
        &self,
        evening_id: &str,
    ) -> Result<StatusChangeResponse, AppError> {
        self.change_status(evening_id, EveningStatus::Finalized)
            .await
    }

    /// Recomputes the results of a completed evening and rebuilds its year
    #[instrument(skip(self))]
    pub async fn on_recalculate_requested(&self, evening_id: &str) -> Result<Evening, AppError> {
        let mut evening = self.get_evening(evening_id).await?;
        if !evening.status.is_completed() {
            return Err(AppError::Conflict(format!(
                "Evening {} is {} and cannot be recalculated",
                evening_id, evening.status
            )));
        }

        evening.refresh_stats();
        self.repository.update_evening(&evening).await?;
        let rows = self.rebuild_year(evening.year).await?;

        info!(evening_id, year = evening.year, rows, "Evening recalculated");
        Ok(evening)
    }

    async fn rebuild_year(&self, year: i32) -> Result<usize, AppError> {
        self.stats_service.rebuild_year(year).await.map_err(|e| {
            error!(year, error = %e, "Failed to rebuild user stats");
            AppError::StatsUpdateFailed(e.to_string())
        })
    }
}

fn validate_scores(games: &[PlayedGame]) -> Result<(), AppError> {
    match find_oversized_score(games) {
        Some((user_id, points)) => Err(AppError::BadRequest(format!(
            "Score of {} for {} exceeds the maximum of {}",
            points, user_id, MAX_SCORE_POINTS
        ))),
        None => Ok(()),
    }
}
