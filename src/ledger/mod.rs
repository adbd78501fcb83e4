//! Streak & Points Calculator
//!
//! Pure functions over a habit's completion history. The Recorder loads
//! the full history inside its transaction and hands it to this module;
//! nothing here touches storage. Full-history recomputation is the only
//! correct option after structural edits (plaster inserts, deletions),
//! because those can move streak boundaries arbitrarily far in the past.

pub mod calculator;
pub mod plan;

pub use calculator::{
    find_last_plaster_since, find_streak_start, next_completion_points,
    points_for_goal_meeting_completion, recompute_aggregates, AggregateTotals,
};
pub use plan::{
    derive_plaster_state, plan_completion, plan_past_completion, CompletionPlan,
    PAST_COMPLETION_COST,
};
