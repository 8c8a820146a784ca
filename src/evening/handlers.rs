use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::Evening,
    service::EveningService,
    types::{CreateEveningRequest, StatusChangeRequest, StatusChangeResponse, UpdateGamesRequest},
};
use crate::shared::{AppError, AppState};

fn evening_service(state: &AppState) -> EveningService {
    EveningService::new(
        Arc::clone(&state.evening_repository),
        Arc::clone(&state.stats_service),
    )
}

/// HTTP handler for creating a new evening
///
/// POST /evenings
#[instrument(name = "create_evening", skip(state, request))]
pub async fn create_evening(
    State(state): State<AppState>,
    Json(request): Json<CreateEveningRequest>,
) -> Result<Json<Evening>, AppError> {
    info!(year = request.year, "Creating new evening");

    let evening = evening_service(&state).create_evening(request).await?;
    Ok(Json(evening))
}

/// GET /evenings/:id
#[instrument(name = "get_evening", skip(state))]
pub async fn get_evening(
    State(state): State<AppState>,
    Path(evening_id): Path<String>,
) -> Result<Json<Evening>, AppError> {
    let evening = evening_service(&state).get_evening(&evening_id).await?;
    Ok(Json(evening))
}

/// PUT /evenings/:id/games
#[instrument(name = "update_evening_games", skip(state, request))]
pub async fn update_evening_games(
    State(state): State<AppState>,
    Path(evening_id): Path<String>,
    Json(request): Json<UpdateGamesRequest>,
) -> Result<Json<Evening>, AppError> {
    let evening = evening_service(&state)
        .update_games(&evening_id, request.games)
        .await?;
    Ok(Json(evening))
}

/// HTTP handler for status changes
///
/// PATCH /evenings/:id/status
/// Finalizing computes the evening results and rebuilds the year statistics
#[instrument(name = "change_evening_status", skip(state))]
pub async fn change_evening_status(
    State(state): State<AppState>,
    Path(evening_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    info!(evening_id = %evening_id, status = %request.status, "Changing evening status");

    let response = evening_service(&state)
        .change_status(&evening_id, request.status)
        .await?;
    Ok(Json(response))
}

/// POST /evenings/:id/recalculate
#[instrument(name = "recalculate_evening", skip(state))]
pub async fn recalculate_evening(
    State(state): State<AppState>,
    Path(evening_id): Path<String>,
) -> Result<Json<Evening>, AppError> {
    info!(evening_id = %evening_id, "Recalculating evening");

    let evening = evening_service(&state)
        .on_recalculate_requested(&evening_id)
        .await?;
    Ok(Json(evening))
}
