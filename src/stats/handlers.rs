use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument};

use super::{
    models::{EveningSummary, GameStat, LeaderboardEntry, MultiYearStats, UserStat},
    types::{OptionalYearQuery, YearQuery},
};
use crate::shared::{AppError, AppState};

/// GET /stats/leaderboard?year=2025
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let leaderboard = state.stats_service.get_leaderboard(query.year).await?;
    info!(year = query.year, entries = leaderboard.len(), "Leaderboard loaded");
    Ok(Json(leaderboard))
}

/// GET /stats/user/:user_id?year=2025
#[instrument(name = "get_user_stats", skip(state))]
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<YearQuery>,
) -> Result<Json<UserStat>, AppError> {
    let stat = state
        .stats_service
        .get_user_stats(&user_id, query.year)
        .await?;
    Ok(Json(stat))
}

/// GET /stats/user/:user_id/all
#[instrument(name = "get_user_stats_all_years", skip(state))]
pub async fn get_user_stats_all_years(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MultiYearStats>, AppError> {
    let profile = state
        .stats_service
        .get_user_stats_all_years(&user_id)
        .await?;
    Ok(Json(profile))
}

/// GET /stats/evenings?year=2025
#[instrument(name = "get_evening_summary", skip(state))]
pub async fn get_evening_summary(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<EveningSummary>, AppError> {
    let summary = state.stats_service.get_evening_summary(query.year).await?;
    Ok(Json(summary))
}

/// GET /stats/games?year=2025 (year optional)
#[instrument(name = "get_game_stats", skip(state))]
pub async fn get_game_stats(
    State(state): State<AppState>,
    Query(query): Query<OptionalYearQuery>,
) -> Result<Json<Vec<GameStat>>, AppError> {
    let stats = state.stats_service.get_game_stats(query.year).await?;
    Ok(Json(stats))
}
