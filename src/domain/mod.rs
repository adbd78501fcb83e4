//! Domain module
//!
//! Core domain types and business rules that do not depend on
//! infrastructure.

pub mod catalog;
pub mod context;
pub mod day;
pub mod error;

pub use catalog::{AchievementCatalog, CatalogEntry};
pub use context::OperationContext;
pub use day::{day_bounds, day_key, days_between};
pub use error::DomainError;
