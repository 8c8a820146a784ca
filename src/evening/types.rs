use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{EveningStatus, PlayedGame};

/// Request payload for creating a new evening
#[derive(Debug, Deserialize)]
pub struct CreateEveningRequest {
    pub year: i32,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub participant_ids: Vec<String>,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub games: Vec<PlayedGame>,
}

/// Request payload for moving an evening to another status
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: EveningStatus,
}

/// Request payload for replacing the games of an evening
#[derive(Debug, Deserialize)]
pub struct UpdateGamesRequest {
    pub games: Vec<PlayedGame>,
}

/// Response for a status change
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusChangeResponse {
    pub evening_id: String,
    pub previous_status: EveningStatus,
    pub status: EveningStatus,
    /// Number of user statistic rows written, if the year was rebuilt
    pub rebuilt_rows: Option<usize>,
}
