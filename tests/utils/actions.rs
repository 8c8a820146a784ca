#![allow(dead_code)] // Test utilities may not all be used in every test

use gamenight::{EveningStatus, PlayedGame, Score};

use super::{evening_builders::EveningBuilder, setup::TestSetup};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Creates an evening and moves it to date_fixed, ready for finalizing
    pub async fn schedule(&self, builder: EveningBuilder) -> String {
        let evening = self
            .evening_service
            .create_evening(builder.build())
            .await
            .unwrap();
        self.evening_service
            .change_status(&evening.id, EveningStatus::DateFixed)
            .await
            .unwrap();
        evening.id
    }

    pub async fn finalize(&self, evening_id: &str) {
        self.evening_service
            .on_evening_finalized(evening_id)
            .await
            .unwrap();
    }

    /// Schedules and finalizes an evening in one step
    pub async fn play(&self, builder: EveningBuilder) -> String {
        let evening_id = self.schedule(builder).await;
        self.finalize(&evening_id).await;
        evening_id
    }

    pub async fn reopen(&self, evening_id: &str) {
        self.evening_service
            .change_status(evening_id, EveningStatus::DateFixed)
            .await
            .unwrap();
    }

    pub async fn archive(&self, evening_id: &str) {
        self.evening_service
            .change_status(evening_id, EveningStatus::Archived)
            .await
            .unwrap();
    }

    /// Replaces the games with a single Catan game carrying the corrected totals
    pub async fn correct_scores(&self, evening_id: &str, scores: &[(&str, u32)]) {
        let game = PlayedGame::new(
            "catan",
            scores.iter().map(|(id, pts)| Score::new(id, *pts)).collect(),
        );
        self.evening_service
            .update_games(evening_id, vec![game])
            .await
            .unwrap();
    }

    pub async fn recalculate(&self, evening_id: &str) {
        self.evening_service
            .on_recalculate_requested(evening_id)
            .await
            .unwrap();
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Plays `count` consecutive weekly evenings where `winner` scores 10 and
    /// everybody else 1
    pub async fn play_weeks_won_by(&self, winner: &str, first_week: i64, count: i64) {
        let members: Vec<&str> = self.members.iter().map(String::as_str).collect();
        for week in first_week..first_week + count {
            let scores: Vec<(&str, u32)> = members
                .iter()
                .map(|m| (*m, if *m == winner { 10 } else { 1 }))
                .collect();
            self.play(
                EveningBuilder::new(self.year, week)
                    .with_participants(&members)
                    .with_scores(&scores),
            )
            .await;
        }
    }
}
