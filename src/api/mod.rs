//! API module
//!
//! HTTP API endpoints, middleware, and shared router state.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::domain::AchievementCatalog;

pub mod middleware;
pub mod routes;

pub use routes::create_router;

/// Shared state for the API router.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog: Arc<AchievementCatalog>,
}

impl AppState {
    pub fn new(pool: PgPool, catalog: AchievementCatalog) -> Self {
        Self {
            pool,
            catalog: Arc::new(catalog),
        }
    }
}
