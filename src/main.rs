use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pageview_analytics::{demo, telemetry, AnalyticsStore, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    telemetry::init_tracing(&config.log_filter, config.log_json);

    info!("Starting page-view analytics v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Build the store ───────────────────────────────────────
    let analytics = Arc::new(AnalyticsStore::new().with_offset(config.utc_offset()?));

    // ── 2. Seed demo data ────────────────────────────────────────
    demo::seed(&analytics, config.seed_demo, analytics.clock().now());

    // ── 3. Build shared state & router ───────────────────────────
    let addr = config.bind_addr()?;
    let state = Arc::new(AppState::new(analytics, config));
    let app = pageview_analytics::create_router(state.clone());

    // ── 4. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}, is it already in use?"))?;

    info!(
        %addr,
        public_url = %state.config.public_url,
        static_dir = %state.config.static_dir,
        "listening: POST /api/track, GET /api/stats, GET /api/stats/stream"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server exited with error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
