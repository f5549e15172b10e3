use axum::{
    middleware as axum_mw,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes, middleware, and static serving.
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // ── Ingestion ───────────────────────────────────────────
        .route(
            "/api/track",
            get(handlers::track::endpoint_info).post(handlers::track::record_view),
        )
        .route(
            "/api/track/snippet",
            get(handlers::track::tracking_snippet),
        )
        // ── Stats ───────────────────────────────────────────────
        .route(
            "/api/stats",
            get(handlers::stats::get_stats).delete(handlers::stats::reset_stats),
        )
        .route("/api/stats/stream", get(handlers::stats::stats_stream))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Serve the static directory for the dashboard ────────
        .fallback_service(ServeDir::new(static_dir))
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(timing::request_span))
        .layer(CorsLayer::permissive())
}
