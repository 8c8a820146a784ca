use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::{
    models::{
        EveningSummary, GameStat, GlobalStats, LeaderboardEntry, MultiYearStats, UserStat,
        YearSummary,
    },
    rebuilder::{percentage, rebuild_year_stats, saturating_sum},
    repository::UserStatRepository,
    StatsError,
};
use crate::evening::repository::EveningRepository;

/// Rebuilds and serves the per-year user statistics
pub struct StatsService {
    evening_repository: Arc<dyn EveningRepository + Send + Sync>,
    repository: Arc<dyn UserStatRepository>,
    year_mutexes: Arc<RwLock<HashMap<i32, Arc<AsyncMutex<()>>>>>,
}

impl StatsService {
    pub fn new(
        evening_repository: Arc<dyn EveningRepository + Send + Sync>,
        repository: Arc<dyn UserStatRepository>,
    ) -> Self {
        Self {
            evening_repository,
            repository,
            year_mutexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Replaces every statistics row of `year` with values recomputed from its
    /// completed evenings. Returns the number of rows written.
    ///
    /// Rebuilds of the same year run one at a time. If the evenings cannot be
    /// loaded the existing rows stay untouched.
    #[instrument(skip(self))]
    pub async fn rebuild_year(&self, year: i32) -> Result<usize, StatsError> {
        let year_lock = self.year_lock(year).await;
        let result = {
            let _guard = year_lock.lock().await;
            self.rebuild_year_locked(year).await
        };
        self.release_year_lock(year, year_lock).await;
        result
    }

    async fn rebuild_year_locked(&self, year: i32) -> Result<usize, StatsError> {
        let evenings = self
            .evening_repository
            .list_completed(Some(year))
            .await
            .map_err(|err| {
                warn!(year, error = %err, "Failed to load evenings for rebuild");
                StatsError::from(err)
            })?;

        let stats = rebuild_year_stats(year, &evenings);
        let row_count = stats.len();
        self.repository.replace_year(year, stats).await?;

        info!(
            year,
            evenings = evenings.len(),
            users = row_count,
            "Rebuilt user stats for year"
        );
        Ok(row_count)
    }

    /// All rows of `year` ranked by total points. An empty year is rebuilt first.
    #[instrument(skip(self))]
    pub async fn get_leaderboard(&self, year: i32) -> Result<Vec<LeaderboardEntry>, StatsError> {
        let mut stats = self.repository.find_by_year(year).await?;
        if stats.is_empty() {
            debug!(year, "No stats for year, rebuilding on demand");
            self.rebuild_year(year).await?;
            stats = self.repository.find_by_year(year).await?;
        }

        stats.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        Ok(stats
            .into_iter()
            .enumerate()
            .map(|(index, stat)| LeaderboardEntry {
                rank: index as u32 + 1,
                win_rate: percentage(stat.total_wins, stat.evenings_attended),
                user_id: stat.user_id,
                total_points: stat.total_points,
                total_wins: stat.total_wins,
                evenings_attended: stat.evenings_attended,
                avg_points: stat.avg_points,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user_stats(&self, user_id: &str, year: i32) -> Result<UserStat, StatsError> {
        if let Some(stat) = self.repository.find_one(user_id, year).await? {
            return Ok(stat);
        }

        let not_found =
            || StatsError::NotFound(format!("No statistics for {} in {}", user_id, year));
        if !self.repository.find_by_year(year).await?.is_empty() {
            // The year is built, the user just did not take part
            return Err(not_found());
        }

        debug!(user_id, year, "No stats for year, rebuilding on demand");
        self.rebuild_year(year).await?;
        self.repository
            .find_one(user_id, year)
            .await?
            .ok_or_else(not_found)
    }

    /// Every year of one user plus totals across all of them
    #[instrument(skip(self))]
    pub async fn get_user_stats_all_years(
        &self,
        user_id: &str,
    ) -> Result<MultiYearStats, StatsError> {
        let stats = self.repository.find_by_user(user_id).await?;
        if stats.is_empty() {
            return Err(StatsError::NotFound(format!(
                "No statistics for {}",
                user_id
            )));
        }

        Ok(MultiYearStats {
            user_id: user_id.to_string(),
            years: stats.iter().map(|s| s.year).collect(),
            by_year: stats.iter().map(|s| (s.year, YearSummary::from(s))).collect(),
            global: aggregate_years(&stats),
        })
    }

    /// Per-year overview of the completed evenings themselves
    #[instrument(skip(self))]
    pub async fn get_evening_summary(&self, year: i32) -> Result<EveningSummary, StatsError> {
        let evenings = self.evening_repository.list_completed(Some(year)).await?;
        let total_evenings = evenings.len() as u32;

        let mut summary = EveningSummary {
            year,
            total_evenings,
            ..EveningSummary::default()
        };
        if evenings.is_empty() {
            return Ok(summary);
        }

        let mut participants = 0u32;
        let mut points = 0u32;
        for evening in &evenings {
            let results = evening.compute_stats();
            let count = evening.participant_ids.len() as u32;

            participants = participants.saturating_add(count);
            points = points.saturating_add(results.total_points);
            summary.max_points = summary.max_points.max(results.max_points);
            summary.most_participants = summary.most_participants.max(count);

            if let Some(organizer) = evening.organizer_id.as_deref().filter(|id| !id.is_empty()) {
                *summary.organizers.entry(organizer.to_string()).or_default() += 1;
            }
        }

        summary.avg_participants = rounded_mean(participants, total_evenings);
        summary.avg_points = rounded_mean(points, total_evenings);
        Ok(summary)
    }

    /// How often each game was played, most played first
    #[instrument(skip(self))]
    pub async fn get_game_stats(&self, year: Option<i32>) -> Result<Vec<GameStat>, StatsError> {
        let evenings = self.evening_repository.list_completed(year).await?;

        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for game_id in evenings
            .iter()
            .flat_map(|e| e.games.iter())
            .filter_map(|g| g.resolved_game_id())
        {
            *counts.entry(game_id.to_string()).or_default() += 1;
        }

        let mut stats: Vec<GameStat> = counts
            .into_iter()
            .map(|(game_id, times_played)| GameStat {
                game_id,
                times_played,
            })
            .collect();
        // BTreeMap order already breaks ties by game ID
        stats.sort_by(|a, b| b.times_played.cmp(&a.times_played));
        Ok(stats)
    }

    async fn year_lock(&self, year: i32) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.year_mutexes.read().await;
            if let Some(lock) = guard.get(&year) {
                return lock.clone();
            }
        }

        let mut guard = self.year_mutexes.write().await;
        guard
            .entry(year)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the year's lock from the map once no other rebuild holds or waits on it
    async fn release_year_lock(&self, year: i32, year_lock: Arc<AsyncMutex<()>>) {
        let mut guard = self.year_mutexes.write().await;
        // One reference in the map, one here
        if Arc::strong_count(&year_lock) == 2 {
            guard.remove(&year);
        }
    }
}

fn rounded_mean(sum: u32, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u32
}

fn aggregate_years(stats: &[UserStat]) -> GlobalStats {
    let total_points = saturating_sum(stats.iter().map(|s| s.total_points));
    let total_evenings = saturating_sum(stats.iter().map(|s| s.evenings_attended));
    let total_possible = saturating_sum(stats.iter().map(|s| s.total_possible_evenings));
    let total_wins = saturating_sum(stats.iter().map(|s| s.total_wins));

    // Weighted by placed evenings, so this is the mean over every placement
    let placed = saturating_sum(stats.iter().map(|s| s.placed_evenings()));
    let place_sum = saturating_sum(
        stats
            .iter()
            .map(|s| saturating_sum([s.first_places, 2 * s.second_places, 3 * s.third_places])),
    );
    let avg_placement = (placed > 0).then(|| place_sum as f64 / placed as f64);

    GlobalStats {
        total_points,
        total_evenings,
        total_possible_evenings: total_possible,
        total_wins,
        avg_points: rounded_mean(total_points, total_evenings),
        attendance_rate: percentage(total_evenings, total_possible),
        win_rate: percentage(total_wins, total_evenings),
        avg_placement,
    }
}
