//! Habit Aggregate Store
//!
//! Persisted per-habit summary fields. Aggregates (`current_streak`,
//! `max_streak`, `total_points`, plaster bookkeeping) are only ever written
//! through `update_aggregates`, which the Recorder calls inside its
//! transaction; clients can never edit them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// A habit row, including its derived aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(rename = "goalCountPerDay")]
    pub goal_count: i32,
    pub goal_period_days: i32,
    pub current_streak: i32,
    pub max_streak: i32,
    pub total_points: i32,
    pub point_streak_reset: bool,
    pub last_missed_completion_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a habit. Aggregates start zeroed.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub goal_count: i32,
    pub goal_period_days: i32,
}

/// Partial update of the client-editable habit fields.
#[derive(Debug, Clone, Default)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub goal_count: Option<i32>,
    pub goal_period_days: Option<i32>,
}

/// New aggregate values written by the Recorder.
#[derive(Debug, Clone)]
pub struct AggregateUpdate {
    pub current_streak: i32,
    pub max_streak: i32,
    pub total_points: i32,
    pub point_streak_reset: bool,
    pub last_missed_completion_date: Option<DateTime<Utc>>,
}

const HABIT_COLUMNS: &str = "id, user_id, name, color, icon, goal_count, goal_period_days, \
     current_streak, max_streak, total_points, point_streak_reset, \
     last_missed_completion_date, created_at";

/// Repository for habit rows.
#[derive(Debug, Clone)]
pub struct HabitStore {
    pool: PgPool,
}

impl HabitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Habit>, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find(&self, habit_id: Uuid) -> Result<Option<Habit>, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = $1"
        ))
        .bind(habit_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Load a habit row with a row lock, serializing concurrent Recorder
    /// operations on the same habit for the lifetime of the transaction.
    pub async fn find_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        habit_id: Uuid,
    ) -> Result<Option<Habit>, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = $1 FOR UPDATE"
        ))
        .bind(habit_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn insert(&self, new_habit: NewHabit) -> Result<Habit, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            r#"
            INSERT INTO habits (user_id, name, color, icon, goal_count, goal_period_days)
            VALUES ($1, $2, $3, COALESCE($4, 'star'), $5, $6)
            RETURNING {HABIT_COLUMNS}
            "#
        ))
        .bind(new_habit.user_id)
        .bind(new_habit.name)
        .bind(new_habit.color)
        .bind(new_habit.icon)
        .bind(new_habit.goal_count)
        .bind(new_habit.goal_period_days)
        .fetch_one(&self.pool)
        .await
    }

    /// Partial update of client-editable fields; aggregates are untouched.
    pub async fn update_fields(
        &self,
        habit_id: Uuid,
        changes: HabitChanges,
    ) -> Result<Habit, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            r#"
            UPDATE habits SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                icon = COALESCE($4, icon),
                goal_count = COALESCE($5, goal_count),
                goal_period_days = COALESCE($6, goal_period_days)
            WHERE id = $1
            RETURNING {HABIT_COLUMNS}
            "#
        ))
        .bind(habit_id)
        .bind(changes.name)
        .bind(changes.color)
        .bind(changes.icon)
        .bind(changes.goal_count)
        .bind(changes.goal_period_days)
        .fetch_one(&self.pool)
        .await
    }

    /// Write recomputed aggregates inside the Recorder's transaction.
    pub async fn update_aggregates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        habit_id: Uuid,
        update: AggregateUpdate,
    ) -> Result<Habit, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            r#"
            UPDATE habits SET
                current_streak = $2,
                max_streak = $3,
                total_points = $4,
                point_streak_reset = $5,
                last_missed_completion_date = $6
            WHERE id = $1
            RETURNING {HABIT_COLUMNS}
            "#
        ))
        .bind(habit_id)
        .bind(update.current_streak)
        .bind(update.max_streak)
        .bind(update.total_points)
        .bind(update.point_streak_reset)
        .bind(update.last_missed_completion_date)
        .fetch_one(&mut **tx)
        .await
    }

    /// Delete a habit; completions and achievements cascade.
    pub async fn delete(&self, habit_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(habit_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Sum of `total_points` across all of the owner's habits, read inside
    /// the Recorder's transaction (the plaster cost gate).
    pub async fn total_points_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(total_points), 0) FROM habits WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
    }
}
