//! Command definitions
//!
//! Commands represent intentions to change a habit's ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Completion, Habit};

// =========================================================================
// RecordCompletionCommand
// =========================================================================

/// Command to record a completion for a habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCompletionCommand {
    pub habit_id: Uuid,
    /// Timestamp of the completion; defaults to now when omitted
    pub completed_at: Option<DateTime<Utc>>,
}

impl RecordCompletionCommand {
    pub fn new(habit_id: Uuid) -> Self {
        Self {
            habit_id,
            completed_at: None,
        }
    }

    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }
}

// =========================================================================
// RecordPastCompletionCommand
// =========================================================================

/// Command to plaster over a missed day in the past.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPastCompletionCommand {
    pub habit_id: Uuid,
    /// Timestamp within the missed day; must be strictly before today
    pub completed_at: DateTime<Utc>,
}

impl RecordPastCompletionCommand {
    pub fn new(habit_id: Uuid, completed_at: DateTime<Utc>) -> Self {
        Self {
            habit_id,
            completed_at,
        }
    }
}

// =========================================================================
// RemoveTodayCommand
// =========================================================================

/// Command to undo the most recent completion recorded today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTodayCommand {
    pub habit_id: Uuid,
}

impl RemoveTodayCommand {
    pub fn new(habit_id: Uuid) -> Self {
        Self { habit_id }
    }
}

// =========================================================================
// DeleteCompletionCommand
// =========================================================================

/// Command to delete a specific completion record by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCompletionCommand {
    pub completion_id: Uuid,
}

impl DeleteCompletionCommand {
    pub fn new(completion_id: Uuid) -> Self {
        Self { completion_id }
    }
}

/// Result of recording a completion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCompletionResult {
    pub completion: Completion,
    pub habit: Habit,
    pub points_earned: i32,
    pub completions_today: i32,
    pub goal_count: i32,
    pub goal_met: bool,
}

/// Result of a successful plaster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPastCompletionResult {
    pub completion: Completion,
    pub habit: Habit,
    pub points_cost: i32,
    pub message: String,
}

/// Result of removing today's most recent completion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTodayResult {
    pub habit: Habit,
}

/// Result of deleting a completion by id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCompletionResult {
    pub habit: Habit,
}
