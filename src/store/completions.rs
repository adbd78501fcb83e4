//! Completion Ledger
//!
//! Append-only storage of completion events per habit. Records are never
//! mutated after insert; removal goes through explicit deletes and the
//! Recorder recomputes aggregates afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::day_bounds;

/// One completion event. `points` is fixed at recording time;
/// `is_missed_completion` marks plaster records (always 0 points).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub points: i32,
    pub is_missed_completion: bool,
    pub created_at: DateTime<Utc>,
}

/// A completion to be appended to the ledger.
#[derive(Debug, Clone)]
pub struct NewCompletion {
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub points: i32,
    pub is_missed_completion: bool,
}

const COMPLETION_COLUMNS: &str =
    "id, habit_id, user_id, completed_at, points, is_missed_completion, created_at";

/// Repository for the completion ledger.
#[derive(Debug, Clone)]
pub struct CompletionLedger {
    pool: PgPool,
}

impl CompletionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a completion inside the Recorder's transaction.
    pub async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new_completion: NewCompletion,
    ) -> Result<Completion, sqlx::Error> {
        sqlx::query_as::<_, Completion>(&format!(
            r#"
            INSERT INTO habit_completions
                (habit_id, user_id, completed_at, points, is_missed_completion)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMPLETION_COLUMNS}
            "#
        ))
        .bind(new_completion.habit_id)
        .bind(new_completion.user_id)
        .bind(new_completion.completed_at)
        .bind(new_completion.points)
        .bind(new_completion.is_missed_completion)
        .fetch_one(&mut **tx)
        .await
    }

    /// Full history for a habit, chronological. Ties within a day are
    /// broken by `created_at` so recording order is preserved.
    pub async fn list_by_habit(&self, habit_id: Uuid) -> Result<Vec<Completion>, sqlx::Error> {
        sqlx::query_as::<_, Completion>(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions \
             WHERE habit_id = $1 ORDER BY completed_at, created_at"
        ))
        .bind(habit_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Same as `list_by_habit`, but reading through the Recorder's
    /// transaction so freshly appended rows are visible to recomputation.
    pub async fn list_by_habit_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        habit_id: Uuid,
    ) -> Result<Vec<Completion>, sqlx::Error> {
        sqlx::query_as::<_, Completion>(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions \
             WHERE habit_id = $1 ORDER BY completed_at, created_at"
        ))
        .bind(habit_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Completions within `[start, end)`.
    pub async fn list_by_habit_and_day_range(
        &self,
        habit_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Completion>, sqlx::Error> {
        sqlx::query_as::<_, Completion>(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions \
             WHERE habit_id = $1 AND completed_at >= $2 AND completed_at < $3 \
             ORDER BY completed_at, created_at"
        ))
        .bind(habit_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    /// The most recently created completion on the given UTC day, if any.
    pub async fn find_most_recent_in_day(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        habit_id: Uuid,
        day: chrono::NaiveDate,
    ) -> Result<Option<Completion>, sqlx::Error> {
        let (start, end) = day_bounds(day);
        sqlx::query_as::<_, Completion>(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions \
             WHERE habit_id = $1 AND completed_at >= $2 AND completed_at < $3 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(habit_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Completion>, sqlx::Error> {
        sqlx::query_as::<_, Completion>(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a single completion inside the Recorder's transaction.
    pub async fn delete_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habit_completions WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
