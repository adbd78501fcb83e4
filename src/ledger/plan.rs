//! Pure planning of Recorder writes.
//!
//! A plan is computed from the habit row and its completion history before
//! anything is persisted; the handler then applies it inside one
//! transaction. This mirrors the split between deciding and persisting:
//! planning can be tested exhaustively without a database.

use chrono::{DateTime, Utc};

use crate::domain::{day_key, DomainError};
use crate::store::{Completion, Habit};

use super::calculator::{day_has_plaster, day_qualifies, points_for_goal_meeting_completion};

/// Fixed point cost of a retroactive "plaster" completion, charged against
/// the owner's total points across all habits.
pub const PAST_COMPLETION_COST: i32 = 10;

/// The values a normal completion will be recorded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPlan {
    /// Points awarded to this completion (0 unless it exactly meets the goal)
    pub points: i32,
    pub new_streak: i32,
    pub new_max_streak: i32,
    /// Completion count for the day including this one
    pub completions_today: i32,
    /// Whether the day's goal is met once this completion is recorded
    pub goal_met: bool,
}

/// Plan recording a completion at `at`.
///
/// The first completion of a day decides the streak: it extends the streak
/// when yesterday qualified and restarts it at 1 otherwise. Points are
/// awarded only to the completion that exactly satisfies the day's goal;
/// every other completion of the day is recorded at 0 points. A day that
/// already holds a plaster record never awards points.
pub fn plan_completion(habit: &Habit, completions: &[Completion], at: DateTime<Utc>) -> CompletionPlan {
    let day = day_key(at);
    let existing_today = completions
        .iter()
        .filter(|c| day_key(c.completed_at) == day)
        .count() as i32;

    let (new_streak, streak_changed) = if existing_today == 0 {
        let yesterday = day - chrono::Duration::days(1);
        if day_qualifies(completions, yesterday, habit.goal_count) {
            (habit.current_streak + 1, true)
        } else {
            (1, true)
        }
    } else {
        (habit.current_streak, false)
    };

    let new_max_streak = if streak_changed {
        habit.max_streak.max(new_streak)
    } else {
        habit.max_streak
    };

    let goal = habit.goal_count.max(1);
    let meets_goal_exactly = existing_today + 1 == goal;
    let points = if meets_goal_exactly && !day_has_plaster(completions, day) {
        points_for_goal_meeting_completion(completions, at, habit.goal_count)
    } else {
        0
    };

    CompletionPlan {
        points,
        new_streak,
        new_max_streak,
        completions_today: existing_today + 1,
        goal_met: existing_today + 1 >= goal,
    }
}

/// Validate a plaster insertion for `date`.
///
/// The day must be strictly in the past, must not already hold any
/// completion record, and the owner's total points across all habits must
/// cover the fixed cost. Nothing is written here; the handler inserts the
/// plaster and recomputes only after this passes.
pub fn plan_past_completion(
    completions: &[Completion],
    date: DateTime<Utc>,
    now: DateTime<Utc>,
    owner_total_points: i32,
) -> Result<(), DomainError> {
    let day = day_key(date);

    if day >= day_key(now) {
        return Err(DomainError::PlasterNotInPast);
    }

    if completions.iter().any(|c| day_key(c.completed_at) == day) {
        return Err(DomainError::DayAlreadyCompleted);
    }

    if owner_total_points < PAST_COMPLETION_COST {
        return Err(DomainError::insufficient_points(
            PAST_COMPLETION_COST,
            owner_total_points,
        ));
    }

    Ok(())
}

/// Re-derive the habit's plaster bookkeeping from the records that remain
/// after a removal: the reset flag is set while any plaster survives, and
/// the last-missed date is the most recent surviving plaster's day.
pub fn derive_plaster_state(completions: &[Completion]) -> (bool, Option<DateTime<Utc>>) {
    let last_plaster = completions
        .iter()
        .filter(|c| c.is_missed_completion)
        .max_by_key(|c| c.completed_at);

    (last_plaster.is_some(), last_plaster.map(|c| c.completed_at))
}
