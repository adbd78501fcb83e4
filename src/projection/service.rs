//! Dashboard projection service

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{day_bounds, day_key};
use crate::ledger::next_completion_points;
use crate::store::{Achievement, AchievementStore, Completion, CompletionLedger, Habit, HabitStore};

/// Days of completion history shown per habit on the dashboard.
const RECENT_WINDOW_DAYS: i64 = 7;
const RECENT_ACHIEVEMENT_LIMIT: i64 = 3;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One habit as the dashboard shows it: stored aggregates plus the
/// derived per-request values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardHabit {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(rename = "goalCountPerDay")]
    pub goal_count: i32,
    pub current_streak: i32,
    pub max_streak: i32,
    pub total_points: i32,
    pub completions_today: i32,
    /// Points the next completion would earn; 0 once today's goal is met
    pub next_completion_points: i32,
    pub recent_completions: Vec<RecentCompletion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCompletion {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub points: i32,
    pub is_missed_completion: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub habits: Vec<DashboardHabit>,
    /// Sum of points across all of the user's habits
    pub total_points: i32,
    pub recent_achievements: Vec<Achievement>,
}

/// Assembles the dashboard view for one user.
#[derive(Debug, Clone)]
pub struct DashboardService {
    habits: HabitStore,
    ledger: CompletionLedger,
    achievements: AchievementStore,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            habits: HabitStore::new(pool.clone()),
            ledger: CompletionLedger::new(pool.clone()),
            achievements: AchievementStore::new(pool),
        }
    }

    pub async fn dashboard(&self, user_id: Uuid) -> Result<DashboardData, ProjectionError> {
        let now = Utc::now();
        let habit_rows = self.habits.list_for_user(user_id).await?;

        let mut habits = Vec::with_capacity(habit_rows.len());
        let mut total_points = 0;

        // The recent window is bounded in SQL; the full history is still
        // needed for the next-completion preview (streak walk-back).
        let window_start = now - Duration::days(RECENT_WINDOW_DAYS);
        let (_, today_end) = day_bounds(day_key(now));

        for habit in habit_rows {
            total_points += habit.total_points;
            let history = self.ledger.list_by_habit(habit.id).await?;
            let window = self
                .ledger
                .list_by_habit_and_day_range(habit.id, window_start, today_end)
                .await?;
            habits.push(project_habit(habit, &history, &window, now));
        }

        let recent_achievements = self
            .achievements
            .recent_for_user(user_id, RECENT_ACHIEVEMENT_LIMIT)
            .await?;

        Ok(DashboardData {
            habits,
            total_points,
            recent_achievements,
        })
    }
}

fn project_habit(
    habit: Habit,
    history: &[Completion],
    recent_window: &[Completion],
    now: DateTime<Utc>,
) -> DashboardHabit {
    let today = day_key(now);
    let completions_today = history
        .iter()
        .filter(|c| day_key(c.completed_at) == today)
        .count() as i32;

    let next_points = next_completion_points(history, habit.goal_count, completions_today, now);

    let mut recent: Vec<RecentCompletion> = recent_window
        .iter()
        .map(|c| RecentCompletion {
            id: c.id,
            completed_at: c.completed_at,
            points: c.points,
            is_missed_completion: c.is_missed_completion,
        })
        .collect();
    recent.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    recent.truncate(RECENT_WINDOW_DAYS as usize);

    DashboardHabit {
        id: habit.id,
        name: habit.name,
        color: habit.color,
        icon: habit.icon,
        goal_count: habit.goal_count,
        current_streak: habit.current_streak,
        max_streak: habit.max_streak,
        total_points: habit.total_points,
        completions_today,
        next_completion_points: next_points,
        recent_completions: recent,
    }
}
