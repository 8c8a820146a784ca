use chrono::{Duration, TimeZone, Utc};

use gamenight::{evening::CreateEveningRequest, PlayedGame, Score};

// ============================================================================
// Evening Setup Utilities
// ============================================================================

/// Builds the request for one evening; `week` places it on the calendar
pub struct EveningBuilder {
    year: i32,
    week: i64,
    participants: Vec<String>,
    host_id: Option<String>,
    organizer_id: Option<String>,
    games: Vec<PlayedGame>,
}

impl EveningBuilder {
    pub fn new(year: i32, week: i64) -> Self {
        Self {
            year,
            week,
            participants: vec![],
            host_id: None,
            organizer_id: None,
            games: vec![],
        }
    }

    pub fn with_participants(mut self, participants: &[&str]) -> Self {
        self.participants = participants.iter().map(|s| s.to_string()).collect();
        self
    }

    #[allow(dead_code)]
    pub fn hosted_by(mut self, host_id: &str) -> Self {
        self.host_id = Some(host_id.to_string());
        self
    }

    #[allow(dead_code)]
    pub fn organized_by(mut self, organizer_id: &str) -> Self {
        self.organizer_id = Some(organizer_id.to_string());
        self
    }

    /// Adds one played game with the given scores
    pub fn with_game(mut self, game_id: &str, scores: &[(&str, u32)]) -> Self {
        self.games.push(PlayedGame::new(
            game_id,
            scores.iter().map(|(id, pts)| Score::new(id, *pts)).collect(),
        ));
        self
    }

    /// Every participant plays one game of Catan with the given totals
    pub fn with_scores(self, scores: &[(&str, u32)]) -> Self {
        self.with_game("catan", scores)
    }

    pub fn build(self) -> CreateEveningRequest {
        let first_evening = Utc.with_ymd_and_hms(self.year, 1, 3, 19, 0, 0).unwrap();

        CreateEveningRequest {
            year: self.year,
            date: Some(first_evening + Duration::weeks(self.week)),
            participant_ids: self.participants,
            host_id: self.host_id,
            organizer_id: self.organizer_id,
            games: self.games,
        }
    }
}
