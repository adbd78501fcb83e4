//! Remove Today Handler
//!
//! Undoes the most recent completion recorded today and recomputes the
//! habit's aggregates from what remains.

use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;

use crate::domain::{day_key, OperationContext};
use crate::error::AppError;
use crate::ledger::{derive_plaster_state, recompute_aggregates};
use crate::store::{AggregateUpdate, CompletionLedger, HabitStore};

use super::{RemoveTodayCommand, RemoveTodayResult};

// =========================================================================
// RemoveTodayHandler
// =========================================================================

/// Handler for undoing today's latest completion.
pub struct RemoveTodayHandler {
    habits: HabitStore,
    ledger: CompletionLedger,
    pool: PgPool,
}

impl RemoveTodayHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            habits: HabitStore::new(pool.clone()),
            ledger: CompletionLedger::new(pool.clone()),
            pool,
        }
    }

    /// Execute the removal
    pub async fn execute(
        &self,
        command: RemoveTodayCommand,
        context: &OperationContext,
    ) -> Result<RemoveTodayResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let habit = self
            .habits
            .find_for_update(&mut tx, command.habit_id)
            .await?
            .ok_or_else(|| AppError::HabitNotFound(command.habit_id.to_string()))?;

        if habit.user_id != context.user_id {
            return Err(AppError::Forbidden("Habit belongs to another user".to_string()));
        }

        let today = day_key(Utc::now());
        let target = self
            .ledger
            .find_most_recent_in_day(&mut tx, habit.id, today)
            .await?
            .ok_or_else(|| {
                AppError::CompletionNotFound("No completion recorded today".to_string())
            })?;

        self.ledger.delete_by_id(&mut tx, target.id).await?;

        let history = self.ledger.list_by_habit_in_tx(&mut tx, habit.id).await?;
        let totals = recompute_aggregates(&history, habit.max_streak);
        let (point_streak_reset, last_missed) = derive_plaster_state(&history);

        let updated_habit = self
            .habits
            .update_aggregates(
                &mut tx,
                habit.id,
                AggregateUpdate {
                    current_streak: totals.current_streak,
                    max_streak: totals.max_streak,
                    total_points: totals.total_points,
                    point_streak_reset,
                    last_missed_completion_date: last_missed,
                },
            )
            .await?;

        tx.commit().await?;

        debug!(
            habit_id = %updated_habit.id,
            removed_completion = %target.id,
            streak = updated_habit.current_streak,
            "Today's completion removed"
        );

        Ok(RemoveTodayResult {
            habit: updated_habit,
        })
    }
}
