use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Postgres, QueryBuilder, Row};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{
    models::{PlacementTrendEntry, ScoreTrendEntry, UserStat},
    StatsError,
};

/// Store of per-user, per-year statistics.
///
/// A year is only ever written as a whole: `replace_year` swaps the complete
/// row set, so readers see either the previous or the new partition.
#[async_trait]
pub trait UserStatRepository: Send + Sync {
    async fn replace_year(&self, year: i32, stats: Vec<UserStat>) -> Result<(), StatsError>;
    async fn find_by_year(&self, year: i32) -> Result<Vec<UserStat>, StatsError>;
    async fn find_one(&self, user_id: &str, year: i32) -> Result<Option<UserStat>, StatsError>;

    /// All years of one user, oldest first
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<UserStat>, StatsError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserStatRepository {
    years: Arc<RwLock<HashMap<i32, BTreeMap<String, UserStat>>>>,
}

impl InMemoryUserStatRepository {
    pub fn new() -> Self {
        Self {
            years: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserStatRepository for InMemoryUserStatRepository {
    async fn replace_year(&self, year: i32, stats: Vec<UserStat>) -> Result<(), StatsError> {
        let partition: BTreeMap<String, UserStat> = stats
            .into_iter()
            .map(|stat| (stat.user_id.clone(), stat))
            .collect();

        let mut years = self.years.write().await;
        if partition.is_empty() {
            years.remove(&year);
        } else {
            years.insert(year, partition);
        }
        Ok(())
    }

    async fn find_by_year(&self, year: i32) -> Result<Vec<UserStat>, StatsError> {
        let years = self.years.read().await;
        Ok(years
            .get(&year)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, user_id: &str, year: i32) -> Result<Option<UserStat>, StatsError> {
        let years = self.years.read().await;
        Ok(years
            .get(&year)
            .and_then(|partition| partition.get(user_id))
            .cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<UserStat>, StatsError> {
        let years = self.years.read().await;
        let mut stats: Vec<UserStat> = years
            .values()
            .filter_map(|partition| partition.get(user_id).cloned())
            .collect();
        stats.sort_by_key(|stat| stat.year);
        Ok(stats)
    }
}

/// PostgreSQL implementation; the year is replaced inside one transaction
pub struct PostgresUserStatRepository {
    pool: PgPool,
}

impl PostgresUserStatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_STAT_COLUMNS: &str = "user_id, year, total_points, total_wins, evenings_attended, \
    total_possible_evenings, avg_points, average_placement, best_evening_points, \
    worst_evening_points, win_rate, attendance_rate, first_places, second_places, third_places, \
    other_places, host_count, longest_win_streak, last_win_date, longest_attendance_streak, \
    longest_absence_streak, peak_performance, score_trend, placement_trend";

fn get_count(row: &PgRow, column: &str) -> Result<u32, StatsError> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| StatsError::Repository(format!("Column {} out of range: {}", column, value)))
}

fn user_stat_from_row(row: &PgRow) -> Result<UserStat, StatsError> {
    let score_trend: Json<Vec<ScoreTrendEntry>> = row.try_get("score_trend")?;
    let placement_trend: Json<Vec<PlacementTrendEntry>> = row.try_get("placement_trend")?;

    Ok(UserStat {
        user_id: row.try_get("user_id")?,
        year: row.try_get("year")?,
        total_points: get_count(row, "total_points")?,
        total_wins: get_count(row, "total_wins")?,
        evenings_attended: get_count(row, "evenings_attended")?,
        total_possible_evenings: get_count(row, "total_possible_evenings")?,
        avg_points: row.try_get("avg_points")?,
        average_placement: row.try_get("average_placement")?,
        best_evening_points: get_count(row, "best_evening_points")?,
        worst_evening_points: get_count(row, "worst_evening_points")?,
        win_rate: get_count(row, "win_rate")?,
        attendance_rate: get_count(row, "attendance_rate")?,
        first_places: get_count(row, "first_places")?,
        second_places: get_count(row, "second_places")?,
        third_places: get_count(row, "third_places")?,
        other_places: get_count(row, "other_places")?,
        host_count: get_count(row, "host_count")?,
        longest_win_streak: get_count(row, "longest_win_streak")?,
        last_win_date: row.try_get("last_win_date")?,
        longest_attendance_streak: get_count(row, "longest_attendance_streak")?,
        longest_absence_streak: get_count(row, "longest_absence_streak")?,
        peak_performance: row.try_get("peak_performance")?,
        score_trend: score_trend.0,
        placement_trend: placement_trend.0,
    })
}

#[async_trait]
impl UserStatRepository for PostgresUserStatRepository {
    #[instrument(skip(self, stats), fields(rows = stats.len()))]
    async fn replace_year(&self, year: i32, stats: Vec<UserStat>) -> Result<(), StatsError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM user_stats WHERE year = $1")
            .bind(year)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        debug!(year, deleted, "Cleared user stats for year");

        if !stats.is_empty() {
            let mut insert: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO user_stats ({}) ", USER_STAT_COLUMNS));
            insert.push_values(&stats, |mut row, stat| {
                row.push_bind(&stat.user_id)
                    .push_bind(stat.year)
                    .push_bind(i64::from(stat.total_points))
                    .push_bind(i64::from(stat.total_wins))
                    .push_bind(i64::from(stat.evenings_attended))
                    .push_bind(i64::from(stat.total_possible_evenings))
                    .push_bind(stat.avg_points)
                    .push_bind(stat.average_placement)
                    .push_bind(i64::from(stat.best_evening_points))
                    .push_bind(i64::from(stat.worst_evening_points))
                    .push_bind(i64::from(stat.win_rate))
                    .push_bind(i64::from(stat.attendance_rate))
                    .push_bind(i64::from(stat.first_places))
                    .push_bind(i64::from(stat.second_places))
                    .push_bind(i64::from(stat.third_places))
                    .push_bind(i64::from(stat.other_places))
                    .push_bind(i64::from(stat.host_count))
                    .push_bind(i64::from(stat.longest_win_streak))
                    .push_bind(stat.last_win_date)
                    .push_bind(i64::from(stat.longest_attendance_streak))
                    .push_bind(i64::from(stat.longest_absence_streak))
                    .push_bind(stat.peak_performance)
                    .push_bind(Json(&stat.score_trend))
                    .push_bind(Json(&stat.placement_trend));
            });
            insert.build().execute(&mut *tx).await.map_err(|e| {
                warn!(error = %e, year, "Failed to insert user stats");
                StatsError::from(e)
            })?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_year(&self, year: i32) -> Result<Vec<UserStat>, StatsError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM user_stats WHERE year = $1 ORDER BY user_id",
            USER_STAT_COLUMNS
        ))
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_stat_from_row).collect()
    }

    async fn find_one(&self, user_id: &str, year: i32) -> Result<Option<UserStat>, StatsError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_stats WHERE user_id = $1 AND year = $2",
            USER_STAT_COLUMNS
        ))
        .bind(user_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_stat_from_row).transpose()
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<UserStat>, StatsError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM user_stats WHERE user_id = $1 ORDER BY year",
            USER_STAT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_stat_from_row).collect()
    }
}
