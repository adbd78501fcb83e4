//! Achievement store
//!
//! Unlocked achievements per user. Rows are created exactly once per
//! (owner, habit, type) and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::CatalogEntry;

/// An unlocked achievement.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub habit_id: Option<Uuid>,
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    pub points: i32,
    pub unlocked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

const ACHIEVEMENT_COLUMNS: &str =
    "id, user_id, habit_id, achievement_type, title, description, points, unlocked_at, created_at";

/// Repository for unlocked achievements.
#[derive(Debug, Clone)]
pub struct AchievementStore {
    pool: PgPool,
}

impl AchievementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Achievement>, sqlx::Error> {
        sqlx::query_as::<_, Achievement>(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements \
             WHERE user_id = $1 ORDER BY unlocked_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// The `limit` most recently unlocked achievements for a user.
    pub async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Achievement>, sqlx::Error> {
        sqlx::query_as::<_, Achievement>(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements \
             WHERE user_id = $1 ORDER BY unlocked_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Unlock an achievement unless it already exists for this
    /// (owner, habit, type). The unique index makes this race-safe; on
    /// conflict no row is returned and the unlock is treated as a no-op.
    pub async fn insert_if_absent(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        entry: &CatalogEntry,
        unlocked_at: DateTime<Utc>,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        sqlx::query_as::<_, Achievement>(&format!(
            r#"
            INSERT INTO achievements
                (user_id, habit_id, achievement_type, title, description, points, unlocked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, habit_id, achievement_type) DO NOTHING
            RETURNING {ACHIEVEMENT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(habit_id)
        .bind(entry.achievement_type)
        .bind(entry.title)
        .bind(entry.description)
        .bind(entry.points)
        .bind(unlocked_at)
        .fetch_optional(&self.pool)
        .await
    }
}
