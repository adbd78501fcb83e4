//! Read-side projections
//!
//! Query services that assemble client-facing views from the stores.
//! Nothing here writes; derived per-request values (today's count, the
//! next-completion preview) are computed on read.

pub mod service;

pub use service::{
    DashboardData, DashboardHabit, DashboardService, ProjectionError, RecentCompletion,
};
