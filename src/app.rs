use axum::{
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{evening, shared::AppState, stats};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the HTTP router with every route of the service
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/evenings", post(evening::create_evening))
        .route("/evenings/:id", get(evening::get_evening))
        .route("/evenings/:id/games", put(evening::update_evening_games))
        .route("/evenings/:id/status", patch(evening::change_evening_status))
        .route("/evenings/:id/recalculate", post(evening::recalculate_evening))
        .route("/stats/leaderboard", get(stats::get_leaderboard))
        .route("/stats/user/:user_id", get(stats::get_user_stats))
        .route("/stats/user/:user_id/all", get(stats::get_user_stats_all_years))
        .route("/stats/evenings", get(stats::get_evening_summary))
        .route("/stats/games", get(stats::get_game_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
