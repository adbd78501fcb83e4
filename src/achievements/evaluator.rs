//! Evaluates the catalog against a habit after its aggregates change.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::{AchievementCatalog, CatalogEntry, OperationContext};
use crate::store::{Achievement, AchievementStore, Habit};

/// Runs after a Recorder operation commits and unlocks any streak
/// achievements the habit's new state has earned. Unlock failures are the
/// caller's problem to downgrade; evaluation itself never touches habit
/// state.
#[derive(Debug, Clone)]
pub struct AchievementEvaluator {
    store: AchievementStore,
    catalog: Arc<AchievementCatalog>,
}

impl AchievementEvaluator {
    pub fn new(store: AchievementStore, catalog: Arc<AchievementCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Unlock every streak achievement whose threshold the habit's
    /// `current_streak` matches exactly. Matching is by equality, not
    /// `>=`: a streak that jumps past a threshold (after a plaster
    /// recomputation, say) does not unlock the skipped entry.
    pub async fn evaluate_streaks(
        &self,
        habit: &Habit,
        context: &OperationContext,
    ) -> Result<Vec<Achievement>, sqlx::Error> {
        let mut unlocked = Vec::new();

        for entry in self.catalog.streak_entries() {
            if !matches_streak(entry, habit.current_streak) {
                continue;
            }

            if let Some(achievement) = self
                .store
                .insert_if_absent(habit.user_id, habit.id, entry, Utc::now())
                .await?
            {
                info!(
                    user_id = %context.user_id,
                    habit_id = %habit.id,
                    achievement_type = entry.achievement_type,
                    streak = habit.current_streak,
                    "Achievement unlocked"
                );
                unlocked.push(achievement);
            }
        }

        Ok(unlocked)
    }
}

fn matches_streak(entry: &CatalogEntry, current_streak: i32) -> bool {
    entry.streak_threshold == Some(current_streak)
}
