use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::calculator::calculate_evening_stats;

/// Lifecycle state of an evening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EveningStatus {
    /// Still being scheduled via a date poll
    Open,
    /// Date is fixed, scores are being recorded
    DateFixed,
    /// Scores are locked and the evening counts towards the year statistics
    Finalized,
    /// Read-only, still counts towards the year statistics
    Archived,
}

impl EveningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EveningStatus::Open => "open",
            EveningStatus::DateFixed => "date_fixed",
            EveningStatus::Finalized => "finalized",
            EveningStatus::Archived => "archived",
        }
    }

    /// Finalized and archived evenings are the ones aggregated into year statistics
    pub fn is_completed(&self) -> bool {
        matches!(self, EveningStatus::Finalized | EveningStatus::Archived)
    }

    pub fn can_transition_to(&self, next: EveningStatus) -> bool {
        use EveningStatus::*;
        matches!(
            (self, next),
            (Open, DateFixed)
                | (DateFixed, Open)
                | (DateFixed, Finalized)
                | (Finalized, DateFixed)
                | (Finalized, Archived)
                | (Archived, Finalized)
        )
    }
}

impl fmt::Display for EveningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EveningStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(EveningStatus::Open),
            "date_fixed" => Ok(EveningStatus::DateFixed),
            "finalized" => Ok(EveningStatus::Finalized),
            "archived" => Ok(EveningStatus::Archived),
            other => Err(format!("Unknown evening status: {}", other)),
        }
    }
}

/// Points a single participant scored in one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// May be missing for scores referencing removed users
    pub user_id: Option<String>,
    pub points: u32,
}

impl Score {
    pub fn new(user_id: &str, points: u32) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            points,
        }
    }

    /// Participant id, if it refers to anyone at all
    pub fn resolved_user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// One game played during an evening
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedGame {
    pub game_id: Option<String>,
    #[serde(default)]
    pub scores: Vec<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PlayedGame {
    pub fn new(game_id: &str, scores: Vec<Score>) -> Self {
        Self {
            game_id: Some(game_id.to_string()),
            scores,
            notes: None,
        }
    }

    pub fn resolved_game_id(&self) -> Option<&str> {
        self.game_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub user_id: String,
    pub place: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPoints {
    pub user_id: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCount {
    pub game_id: String,
    pub count: u32,
}

/// Results derived from an evening's games and roster.
///
/// Stored on the evening as a cache. It goes stale as soon as `games` or the
/// roster change, so anything that aggregates results recomputes it with
/// [`Evening::compute_stats`] instead of reading the stored copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveningStats {
    pub winner_ids: Vec<String>,
    pub max_points: u32,
    pub total_points: u32,
    pub placements: Vec<Placement>,
    /// Sorted by points, descending
    pub player_points: Vec<PlayerPoints>,
    pub game_count: Vec<GameCount>,
    pub participant_count: u32,
    pub games_played_count: u32,
}

impl EveningStats {
    /// Result for an evening without any usable scores
    pub fn empty(participant_count: u32) -> Self {
        Self {
            participant_count,
            ..Self::default()
        }
    }

    pub fn placement_of(&self, user_id: &str) -> Option<u32> {
        self.placements
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.place)
    }

    pub fn points_of(&self, user_id: &str) -> u32 {
        self.player_points
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.points)
            .unwrap_or_default()
    }

    pub fn is_winner(&self, user_id: &str) -> bool {
        self.winner_ids.iter().any(|id| id == user_id)
    }
}

/// One game night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evening {
    pub id: String,
    pub year: i32,
    pub date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub status: EveningStatus,
    pub participant_ids: Vec<String>,
    pub host_id: Option<String>,
    pub organizer_id: Option<String>,
    pub games: Vec<PlayedGame>,
    /// Cached results, `None` until first computed
    pub stats: Option<EveningStats>,
}

impl Evening {
    /// Creates an open evening with a generated ID. Duplicate roster entries are dropped.
    pub fn new(year: i32, participant_ids: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let participant_ids = participant_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            year,
            date: None,
            created_at: Utc::now(),
            status: EveningStatus::Open,
            participant_ids,
            host_id: None,
            organizer_id: None,
            games: Vec::new(),
            stats: None,
        }
    }

    /// Date used for chronological ordering and trend entries
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.date.unwrap_or(self.created_at)
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == user_id)
    }

    pub fn is_hosted_by(&self, user_id: &str) -> bool {
        self.host_id.as_deref() == Some(user_id)
    }

    /// Recomputes the results from the current games and roster
    pub fn compute_stats(&self) -> EveningStats {
        calculate_evening_stats(&self.games, &self.participant_ids)
    }

    /// Recomputes the results and stores them as the cached copy
    pub fn refresh_stats(&mut self) -> &EveningStats {
        let stats = self.compute_stats();
        self.stats.insert(stats)
    }
}

/// Sorts evenings by date (creation time when no date is set), then by ID
pub fn sort_chronologically(evenings: &mut [Evening]) {
    evenings.sort_by(|a, b| {
        a.effective_date()
            .cmp(&b.effective_date())
            .then_with(|| a.id.cmp(&b.id))
    });
}
