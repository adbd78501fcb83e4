//! Record Completion Handler
//!
//! Records one completion for a habit and applies the planned streak and
//! point changes in a single transaction.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::achievements::AchievementEvaluator;
use crate::domain::{AchievementCatalog, OperationContext};
use crate::error::AppError;
use crate::ledger::plan_completion;
use crate::store::{
    AchievementStore, AggregateUpdate, CompletionLedger, HabitStore, NewCompletion,
};

use super::{RecordCompletionCommand, RecordCompletionResult};

// =========================================================================
// RecordCompletionHandler
// =========================================================================

/// Handler for recording completions.
pub struct RecordCompletionHandler {
    habits: HabitStore,
    ledger: CompletionLedger,
    evaluator: AchievementEvaluator,
    pool: PgPool,
}

impl RecordCompletionHandler {
    pub fn new(pool: PgPool, catalog: Arc<AchievementCatalog>) -> Self {
        Self {
            habits: HabitStore::new(pool.clone()),
            ledger: CompletionLedger::new(pool.clone()),
            evaluator: AchievementEvaluator::new(AchievementStore::new(pool.clone()), catalog),
            pool,
        }
    }

    /// Execute the record command
    pub async fn execute(
        &self,
        command: RecordCompletionCommand,
        context: &OperationContext,
    ) -> Result<RecordCompletionResult, AppError> {
        let completed_at = command.completed_at.unwrap_or_else(Utc::now);

        let mut tx = self.pool.begin().await?;

        // The row lock serializes concurrent recorder operations per habit.
        let habit = self
            .habits
            .find_for_update(&mut tx, command.habit_id)
            .await?
            .ok_or_else(|| AppError::HabitNotFound(command.habit_id.to_string()))?;

        if habit.user_id != context.user_id {
            return Err(AppError::Forbidden("Habit belongs to another user".to_string()));
        }

        let history = self.ledger.list_by_habit_in_tx(&mut tx, habit.id).await?;
        let plan = plan_completion(&habit, &history, completed_at);

        let completion = self
            .ledger
            .append(
                &mut tx,
                NewCompletion {
                    habit_id: habit.id,
                    user_id: habit.user_id,
                    completed_at,
                    points: plan.points,
                    is_missed_completion: false,
                },
            )
            .await?;

        // A normal completion clears plaster bookkeeping.
        let updated_habit = self
            .habits
            .update_aggregates(
                &mut tx,
                habit.id,
                AggregateUpdate {
                    current_streak: plan.new_streak,
                    max_streak: plan.new_max_streak,
                    total_points: habit.total_points + plan.points,
                    point_streak_reset: false,
                    last_missed_completion_date: None,
                },
            )
            .await?;

        tx.commit().await?;

        debug!(
            habit_id = %updated_habit.id,
            points = plan.points,
            streak = plan.new_streak,
            completions_today = plan.completions_today,
            "Completion recorded"
        );

        // Unlock failures never fail the recording itself.
        if plan.points > 0 {
            if let Err(e) = self
                .evaluator
                .evaluate_streaks(&updated_habit, context)
                .await
            {
                warn!(habit_id = %updated_habit.id, error = %e, "Achievement evaluation failed");
            }
        }

        Ok(RecordCompletionResult {
            completion,
            goal_count: updated_habit.goal_count,
            habit: updated_habit,
            points_earned: plan.points,
            completions_today: plan.completions_today,
            goal_met: plan.goal_met,
        })
    }
}
