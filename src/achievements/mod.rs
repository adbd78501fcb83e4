//! Achievement evaluation
//!
//! Checks a habit's state against the catalog after Recorder operations
//! and unlocks anything newly earned.

mod evaluator;

pub use evaluator::AchievementEvaluator;
