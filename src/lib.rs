//! habitPoints Library
//!
//! Re-exports modules for integration testing and external use.

pub mod achievements;
pub mod api;
pub mod domain;
pub mod handlers;
pub mod ledger;
pub mod projection;
pub mod store;

// Private modules (used only by main.rs binary)
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{AchievementCatalog, DomainError, OperationContext};
