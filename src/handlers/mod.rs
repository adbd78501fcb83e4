//! Command handlers
//!
//! Each recorder operation has its own handler. Handlers own the
//! transaction: they lock the habit row, plan or recompute against the
//! full completion history, write the results, and commit.

pub mod commands;
pub mod delete_completion;
pub mod record_completion;
pub mod record_past_completion;
pub mod remove_today;

pub use commands::{
    DeleteCompletionCommand, DeleteCompletionResult, RecordCompletionCommand,
    RecordCompletionResult, RecordPastCompletionCommand, RecordPastCompletionResult,
    RemoveTodayCommand, RemoveTodayResult,
};
pub use delete_completion::DeleteCompletionHandler;
pub use record_completion::RecordCompletionHandler;
pub use record_past_completion::RecordPastCompletionHandler;
pub use remove_today::RemoveTodayHandler;
