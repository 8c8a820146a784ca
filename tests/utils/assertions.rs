//! Test assertion helpers - fluent API for verifying user statistics
#![allow(dead_code)] // Test utilities may not all be used in every test

use gamenight::stats::UserStat;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct StatAssertion {
    stat: UserStat,
}

impl StatAssertion {
    /// Loads the stored row for `user_id` in the setup's year, failing if absent
    pub async fn for_user(setup: &TestSetup, user_id: &str) -> Self {
        let stat = setup
            .stats_service
            .get_user_stats(user_id, setup.year)
            .await
            .unwrap_or_else(|e| panic!("{} should have stats: {}", user_id, e));
        Self { stat }
    }

    pub fn total_points(self, expected: u32) -> Self {
        assert_eq!(
            self.stat.total_points, expected,
            "{} total points",
            self.stat.user_id
        );
        self
    }

    pub fn wins(self, expected: u32) -> Self {
        assert_eq!(self.stat.total_wins, expected, "{} wins", self.stat.user_id);
        self
    }

    pub fn attended(self, attended: u32, possible: u32) -> Self {
        assert_eq!(
            (self.stat.evenings_attended, self.stat.total_possible_evenings),
            (attended, possible),
            "{} attendance",
            self.stat.user_id
        );
        self
    }

    /// First, second, third and other places
    pub fn places(self, expected: [u32; 4]) -> Self {
        let actual = [
            self.stat.first_places,
            self.stat.second_places,
            self.stat.third_places,
            self.stat.other_places,
        ];
        assert_eq!(actual, expected, "{} placements", self.stat.user_id);
        self
    }

    pub fn win_streak(self, expected: u32) -> Self {
        assert_eq!(
            self.stat.longest_win_streak, expected,
            "{} win streak",
            self.stat.user_id
        );
        self
    }

    pub fn stat(&self) -> &UserStat {
        &self.stat
    }
}
