//! Storage module
//!
//! Repositories over Postgres. Pure storage access; business rules live in
//! `ledger` and `handlers`. Write methods take a transaction so a Recorder
//! operation commits as one atomic unit.

mod achievements;
mod completions;
mod habits;

pub use achievements::{Achievement, AchievementStore};
pub use completions::{Completion, CompletionLedger, NewCompletion};
pub use habits::{AggregateUpdate, Habit, HabitChanges, HabitStore, NewHabit};
