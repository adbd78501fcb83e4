//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Business rule violations and domain invariant failures.
///
/// These are independent of the web/storage layers; `AppError` maps them
/// to HTTP responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The owner's total points across all habits cannot cover the plaster cost
    #[error("Not enough points for this!")]
    InsufficientPoints { required: i32, available: i32 },

    /// A plaster may only be inserted for a day strictly in the past
    #[error("Date must be in the past")]
    PlasterNotInPast,

    /// The target day already holds a completion record
    #[error("Completion already exists for this date")]
    DayAlreadyCompleted,

    /// Goal count must require at least one completion per day
    #[error("Invalid goal count: {0}")]
    InvalidGoalCount(i32),

    /// Caller does not own the resource
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl DomainError {
    /// Create an insufficient points error
    pub fn insufficient_points(required: i32, available: i32) -> Self {
        Self::InsufficientPoints {
            required,
            available,
        }
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        // Every domain error here is a rejected request, not a server fault
        true
    }
}
