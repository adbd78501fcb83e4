//! Record Past Completion Handler
//!
//! Inserts a zero-point "plaster" record over a missed day, charges the
//! fixed cost against the owner's points, and recomputes the habit's
//! aggregates from the full history.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::achievements::AchievementEvaluator;
use crate::domain::{AchievementCatalog, OperationContext};
use crate::error::AppError;
use crate::ledger::{plan_past_completion, recompute_aggregates, PAST_COMPLETION_COST};
use crate::store::{
    AchievementStore, AggregateUpdate, CompletionLedger, HabitStore, NewCompletion,
};

use super::{RecordPastCompletionCommand, RecordPastCompletionResult};

const PLASTER_MESSAGE: &str = "Past completion added. 10 points deducted. \
     Your next completion will earn 1 point (streak point worthiness reset).";

// =========================================================================
// RecordPastCompletionHandler
// =========================================================================

/// Handler for plastering missed days.
pub struct RecordPastCompletionHandler {
    habits: HabitStore,
    ledger: CompletionLedger,
    evaluator: AchievementEvaluator,
    pool: PgPool,
}

impl RecordPastCompletionHandler {
    pub fn new(pool: PgPool, catalog: Arc<AchievementCatalog>) -> Self {
        Self {
            habits: HabitStore::new(pool.clone()),
            ledger: CompletionLedger::new(pool.clone()),
            evaluator: AchievementEvaluator::new(AchievementStore::new(pool.clone()), catalog),
            pool,
        }
    }

    /// Execute the plaster command
    pub async fn execute(
        &self,
        command: RecordPastCompletionCommand,
        context: &OperationContext,
    ) -> Result<RecordPastCompletionResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let habit = self
            .habits
            .find_for_update(&mut tx, command.habit_id)
            .await?
            .ok_or_else(|| AppError::HabitNotFound(command.habit_id.to_string()))?;

        if habit.user_id != context.user_id {
            return Err(AppError::Forbidden("Habit belongs to another user".to_string()));
        }

        let history = self.ledger.list_by_habit_in_tx(&mut tx, habit.id).await?;

        // The cost gate spans every habit the owner has, not just this one.
        let owner_total = self
            .habits
            .total_points_for_user(&mut tx, context.user_id)
            .await? as i32;

        plan_past_completion(&history, command.completed_at, Utc::now(), owner_total)?;

        let completion = self
            .ledger
            .append(
                &mut tx,
                NewCompletion {
                    habit_id: habit.id,
                    user_id: habit.user_id,
                    completed_at: command.completed_at,
                    points: 0,
                    is_missed_completion: true,
                },
            )
            .await?;

        // The plaster can join two runs, so everything is recomputed from
        // the full history before the cost comes off.
        let history = self.ledger.list_by_habit_in_tx(&mut tx, habit.id).await?;
        let totals = recompute_aggregates(&history, habit.max_streak);
        let total_points = (totals.total_points - PAST_COMPLETION_COST).max(0);

        let updated_habit = self
            .habits
            .update_aggregates(
                &mut tx,
                habit.id,
                AggregateUpdate {
                    current_streak: totals.current_streak,
                    max_streak: totals.max_streak,
                    total_points,
                    point_streak_reset: true,
                    last_missed_completion_date: Some(command.completed_at),
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            habit_id = %updated_habit.id,
            plastered_day = %command.completed_at.date_naive(),
            cost = PAST_COMPLETION_COST,
            streak = updated_habit.current_streak,
            "Past completion recorded"
        );

        if let Err(e) = self
            .evaluator
            .evaluate_streaks(&updated_habit, context)
            .await
        {
            warn!(habit_id = %updated_habit.id, error = %e, "Achievement evaluation failed");
        }

        Ok(RecordPastCompletionResult {
            completion,
            habit: updated_habit,
            points_cost: PAST_COMPLETION_COST,
            message: PLASTER_MESSAGE.to_string(),
        })
    }
}
