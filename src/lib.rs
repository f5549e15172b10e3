//! In-memory page-view analytics.
//!
//! A bounded event store fed by `POST /api/track`, rolled up on demand into
//! the totals, "active now" count, 24-slot hourly series and recent feed
//! served by `GET /api/stats`.

use std::sync::Arc;

pub mod analytics;
pub mod config;
pub mod demo;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod telemetry;

pub use analytics::{AnalyticsStore, PageViewEvent, Stats};
pub use config::Config;
pub use server::create_router;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Page-view store. The track handler pushes events, stats endpoints read snapshots.
    pub analytics: Arc<AnalyticsStore>,

    pub config: Config,
}

impl AppState {
    pub fn new(analytics: Arc<AnalyticsStore>, config: Config) -> Self {
        Self { analytics, config }
    }
}
