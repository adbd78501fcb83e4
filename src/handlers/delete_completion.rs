//! Delete Completion Handler
//!
//! Deletes one completion record by id (including plaster records) and
//! recomputes the owning habit's aggregates.

use sqlx::PgPool;
use tracing::debug;

use crate::domain::OperationContext;
use crate::error::AppError;
use crate::ledger::{derive_plaster_state, recompute_aggregates};
use crate::store::{AggregateUpdate, CompletionLedger, HabitStore};

use super::{DeleteCompletionCommand, DeleteCompletionResult};

// =========================================================================
// DeleteCompletionHandler
// =========================================================================

/// Handler for deleting a completion by id.
pub struct DeleteCompletionHandler {
    habits: HabitStore,
    ledger: CompletionLedger,
    pool: PgPool,
}

impl DeleteCompletionHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            habits: HabitStore::new(pool.clone()),
            ledger: CompletionLedger::new(pool.clone()),
            pool,
        }
    }

    /// Execute the deletion
    pub async fn execute(
        &self,
        command: DeleteCompletionCommand,
        context: &OperationContext,
    ) -> Result<DeleteCompletionResult, AppError> {
        let completion = self
            .ledger
            .find_by_id(command.completion_id)
            .await?
            .ok_or_else(|| AppError::CompletionNotFound(command.completion_id.to_string()))?;

        if completion.user_id != context.user_id {
            return Err(AppError::Forbidden(
                "Completion belongs to another user".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // Lock the habit before deleting so the recomputation cannot race
        // a concurrent recording on the same habit.
        let habit = self
            .habits
            .find_for_update(&mut tx, completion.habit_id)
            .await?
            .ok_or_else(|| AppError::HabitNotFound(completion.habit_id.to_string()))?;

        let deleted = self.ledger.delete_by_id(&mut tx, completion.id).await?;
        if deleted == 0 {
            return Err(AppError::CompletionNotFound(completion.id.to_string()));
        }

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
            completion_id = %completion.id,
            was_plaster = completion.is_missed_completion,
            "Completion deleted"
        );

        Ok(DeleteCompletionResult {
            habit: updated_habit,
        })
    }
}
