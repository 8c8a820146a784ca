use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{sort_chronologically, Evening, EveningStats, EveningStatus, PlayedGame};
use crate::shared::AppError;

/// Trait for evening store operations
#[async_trait]
pub trait EveningRepository {
    async fn create_evening(&self, evening: &Evening) -> Result<(), AppError>;
    async fn get_evening(&self, evening_id: &str) -> Result<Option<Evening>, AppError>;
    async fn update_evening(&self, evening: &Evening) -> Result<(), AppError>;

    /// Finalized and archived evenings in chronological order, for one year or all years
    async fn list_completed(&self, year: Option<i32>) -> Result<Vec<Evening>, AppError>;
}

/// In-memory implementation of EveningRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryEveningRepository {
    evenings: RwLock<HashMap<String, Evening>>,
}

impl InMemoryEveningRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory repository with pre-populated evenings
    pub fn with_evenings(evenings: Vec<Evening>) -> Self {
        let evenings = evenings.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self {
            evenings: RwLock::new(evenings),
        }
    }

    pub async fn evening_count(&self) -> usize {
        self.evenings.read().await.len()
    }
}

#[async_trait]
impl EveningRepository for InMemoryEveningRepository {
    #[instrument(skip(self, evening))]
    async fn create_evening(&self, evening: &Evening) -> Result<(), AppError> {
        debug!(evening_id = %evening.id, year = evening.year, "Creating evening in memory");

        let mut evenings = self.evenings.write().await;
        if evenings.contains_key(&evening.id) {
            warn!(evening_id = %evening.id, "Evening already exists in memory");
            return Err(AppError::DatabaseError(
                "Evening already exists".to_string(),
            ));
        }
        evenings.insert(evening.id.clone(), evening.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_evening(&self, evening_id: &str) -> Result<Option<Evening>, AppError> {
        let evenings = self.evenings.read().await;
        Ok(evenings.get(evening_id).cloned())
    }

    #[instrument(skip(self, evening))]
    async fn update_evening(&self, evening: &Evening) -> Result<(), AppError> {
        debug!(evening_id = %evening.id, status = %evening.status, "Updating evening in memory");

        let mut evenings = self.evenings.write().await;
        match evenings.get_mut(&evening.id) {
            Some(stored) => {
                *stored = evening.clone();
                Ok(())
            }
            None => {
                warn!(evening_id = %evening.id, "Evening not found for update in memory");
                Err(AppError::NotFound("Evening not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_completed(&self, year: Option<i32>) -> Result<Vec<Evening>, AppError> {
        let evenings = self.evenings.read().await;
        let mut completed: Vec<Evening> = evenings
            .values()
            .filter(|e| e.status.is_completed())
            .filter(|e| year.map_or(true, |y| e.year == y))
            .cloned()
            .collect();
        sort_chronologically(&mut completed);

        debug!(count = completed.len(), ?year, "Listed completed evenings from memory");
        Ok(completed)
    }
}

/// PostgreSQL implementation of the evening store
///
/// Games and the cached results live in JSONB columns.
pub struct PostgresEveningRepository {
    pool: PgPool,
}

impl PostgresEveningRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EVENING_COLUMNS: &str = "id, year, date, created_at, status, participant_ids, host_id, organizer_id, games, stats";

fn evening_from_row(row: &PgRow) -> Result<Evening, AppError> {
    let decode = |e: sqlx::Error| AppError::DatabaseError(e.to_string());

    let status: String = row.try_get("status").map_err(decode)?;
    let status = status
        .parse::<EveningStatus>()
        .map_err(AppError::DatabaseError)?;
    let games: Json<Vec<PlayedGame>> = row.try_get("games").map_err(decode)?;
    let stats: Option<Json<EveningStats>> = row.try_get("stats").map_err(decode)?;

    Ok(Evening {
        id: row.try_get("id").map_err(decode)?,
        year: row.try_get("year").map_err(decode)?,
        date: row.try_get("date").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        status,
        participant_ids: row.try_get("participant_ids").map_err(decode)?,
        host_id: row.try_get("host_id").map_err(decode)?,
        organizer_id: row.try_get("organizer_id").map_err(decode)?,
        games: games.0,
        stats: stats.map(|s| s.0),
    })
}

#[async_trait]
impl EveningRepository for PostgresEveningRepository {
    #[instrument(skip(self, evening))]
    async fn create_evening(&self, evening: &Evening) -> Result<(), AppError> {
        debug!(evening_id = %evening.id, "Creating evening in database");

        sqlx::query(
            "INSERT INTO evenings (id, year, date, created_at, status, participant_ids, host_id, organizer_id, games, stats) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&evening.id)
        .bind(evening.year)
        .bind(evening.date)
        .bind(evening.created_at)
        .bind(evening.status.as_str())
        .bind(&evening.participant_ids)
        .bind(&evening.host_id)
        .bind(&evening.organizer_id)
        .bind(Json(&evening.games))
        .bind(evening.stats.as_ref().map(Json))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create evening in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_evening(&self, evening_id: &str) -> Result<Option<Evening>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM evenings WHERE id = $1",
            EVENING_COLUMNS
        ))
        .bind(evening_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, evening_id = %evening_id, "Failed to fetch evening from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.as_ref().map(evening_from_row).transpose()
    }

    #[instrument(skip(self, evening))]
    async fn update_evening(&self, evening: &Evening) -> Result<(), AppError> {
        debug!(evening_id = %evening.id, status = %evening.status, "Updating evening in database");

        let result = sqlx::query(
            "UPDATE evenings SET year = $2, date = $3, status = $4, participant_ids = $5, \
             host_id = $6, organizer_id = $7, games = $8, stats = $9 WHERE id = $1",
        )
        .bind(&evening.id)
        .bind(evening.year)
        .bind(evening.date)
        .bind(evening.status.as_str())
        .bind(&evening.participant_ids)
        .bind(&evening.host_id)
        .bind(&evening.organizer_id)
        .bind(Json(&evening.games))
        .bind(evening.stats.as_ref().map(Json))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, evening_id = %evening.id, "Failed to update evening in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(evening_id = %evening.id, "Evening not found for update");
            return Err(AppError::NotFound("Evening not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_completed(&self, year: Option<i32>) -> Result<Vec<Evening>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM evenings \
             WHERE status IN ('finalized', 'archived') AND ($1::INT IS NULL OR year = $1) \
             ORDER BY COALESCE(date, created_at), id",
            EVENING_COLUMNS
        ))
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, ?year, "Failed to list completed evenings");
            AppError::DatabaseError(e.to_string())
        })?;

        let evenings = rows
            .iter()
            .map(evening_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = evenings.len(), ?year, "Listed completed evenings from database");
        Ok(evenings)
    }
}
