use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTrendEntry {
    pub date: DateTime<Utc>,
    pub points: u32,
    pub evening_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementTrendEntry {
    pub date: DateTime<Utc>,
    pub place: Option<u32>,
    pub evening_id: String,
}

/// Aggregate statistics of one user for one year, regenerated on every rebuild
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStat {
    pub user_id: String,
    pub year: i32,

    pub total_points: u32,
    pub total_wins: u32,
    pub evenings_attended: u32,
    /// Number of completed evenings in the year
    pub total_possible_evenings: u32,

    pub avg_points: f64,
    /// Mean over top-3 placements only
    pub average_placement: Option<f64>,

    pub best_evening_points: u32,
    pub worst_evening_points: u32,

    pub win_rate: u32,
    pub attendance_rate: u32,

    pub first_places: u32,
    pub second_places: u32,
    pub third_places: u32,
    pub other_places: u32,

    pub host_count: u32,

    pub longest_win_streak: u32,
    pub last_win_date: Option<DateTime<Utc>>,
    pub longest_attendance_streak: u32,
    pub longest_absence_streak: u32,

    pub peak_performance: f64,

    pub score_trend: Vec<ScoreTrendEntry>,
    pub placement_trend: Vec<PlacementTrendEntry>,
}

impl UserStat {
    /// Evenings in which the user reached one of the top three places
    pub fn placed_evenings(&self) -> u32 {
        self.first_places + self.second_places + self.third_places
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub total_points: u32,
    pub total_wins: u32,
    pub evenings_attended: u32,
    pub avg_points: f64,
    pub win_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub total_points: u32,
    pub evenings_attended: u32,
    pub win_rate: u32,
    pub attendance_rate: u32,
    pub first_places: u32,
    pub second_places: u32,
    pub third_places: u32,
    pub other_places: u32,
    pub total_possible_evenings: u32,
}

impl From<&UserStat> for YearSummary {
    fn from(stat: &UserStat) -> Self {
        Self {
            total_points: stat.total_points,
            evenings_attended: stat.evenings_attended,
            win_rate: stat.win_rate,
            attendance_rate: stat.attendance_rate,
            first_places: stat.first_places,
            second_places: stat.second_places,
            third_places: stat.third_places,
            other_places: stat.other_places,
            total_possible_evenings: stat.total_possible_evenings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_points: u32,
    pub total_evenings: u32,
    pub total_possible_evenings: u32,
    pub total_wins: u32,
    pub avg_points: u32,
    pub attendance_rate: u32,
    pub win_rate: u32,
    /// Mean over every top-3 placement across all years
    pub avg_placement: Option<f64>,
}

/// Profile of one user across every year with statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiYearStats {
    pub user_id: String,
    pub years: Vec<i32>,
    pub by_year: BTreeMap<i32, YearSummary>,
    pub global: GlobalStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EveningSummary {
    pub year: i32,
    pub total_evenings: u32,
    pub avg_participants: u32,
    pub avg_points: u32,
    pub max_points: u32,
    pub most_participants: u32,
    /// Completed evenings per organizer
    pub organizers: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStat {
    pub game_id: String,
    pub times_played: u32,
}
