use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};

use crate::analytics::Stats;
use crate::AppState;

use super::{Ack, AppError};

/// Upper bound on `?recent=` so one poll cannot dump the whole store.
pub const MAX_RECENT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// How many recent events to include (clamped to 1..=100)
    pub recent: Option<usize>,
}

impl StatsQuery {
    fn recent_limit(&self, default: usize) -> usize {
        self.recent.unwrap_or(default).clamp(1, MAX_RECENT_LIMIT)
    }
}

// ─── GET /api/stats ──────────────────────────────────────────────
/// Returns a single JSON snapshot. This is what the dashboard polls.

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Json<Stats> {
    let limit = query.recent_limit(state.config.recent_limit);
    Json(state.analytics.snapshot_now(limit))
}

// ─── DELETE /api/stats ───────────────────────────────────────────
/// Wipes the store. Only honoured when started with `--allow-reset`.

pub async fn reset_stats(State(state): State<Arc<AppState>>) -> Result<Json<Ack>, AppError> {
    if !state.config.allow_reset {
        return Err(AppError::ResetDisabled);
    }

    let dropped = state.analytics.len();
    state.analytics.reset();
    tracing::info!(dropped, "analytics store reset");

    Ok(Json(Ack::ok()))
}

// ─── GET /api/stats/stream ───────────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes a full `Stats` snapshot as JSON on every configured tick, so a
/// dashboard can subscribe instead of polling. Events are unnamed, so a
/// browser `EventSource.onmessage` handler receives them.

pub async fn stats_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let limit = query.recent_limit(state.config.recent_limit);

    let stream = snapshot_ticks(state, limit).map(|stats| {
        let event = Event::default().json_data(&stats).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to encode stats event");
            Event::default().comment("encode error")
        });
        Ok(event)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// One snapshot per stream interval; the first is taken immediately.
pub fn snapshot_ticks(state: Arc<AppState>, limit: usize) -> impl Stream<Item = Stats> {
    let interval = tokio::time::interval(state.config.stream_interval());
    IntervalStream::new(interval).map(move |_| state.analytics.snapshot_now(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{AnalyticsStore, Clock, ManualClock, PageViewEvent, UNKNOWN_LOCATION};
    use crate::Config;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn state_with_views(paths: &[&str]) -> Arc<AppState> {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let store = Arc::new(AnalyticsStore::with_clock(Arc::new(ManualClock::new(now))));
        for (i, path) in paths.iter().enumerate() {
            let ts = now - TimeDelta::seconds((paths.len() - i) as i64);
            store.record(PageViewEvent::new(*path, "", ts, "10.0.0.1", UNKNOWN_LOCATION));
        }
        Arc::new(AppState::new(store, Config::default()))
    }

    #[test]
    fn recent_limit_defaults_and_clamps() {
        assert_eq!(StatsQuery::default().recent_limit(10), 10);
        assert_eq!(StatsQuery { recent: Some(0) }.recent_limit(10), 1);
        assert_eq!(StatsQuery { recent: Some(3) }.recent_limit(10), 3);
        assert_eq!(StatsQuery { recent: Some(5_000) }.recent_limit(10), MAX_RECENT_LIMIT);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_carries_current_stats() {
        let state = state_with_views(&["/a", "/b", "/c"]);
        let mut ticks = Box::pin(snapshot_ticks(state, 2));

        let stats = ticks.next().await.unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalViews"], 3);
        assert_eq!(json["activeNow"], 3);
        assert_eq!(json["chartData"].as_array().unwrap().len(), 24);
        assert_eq!(json["chartData"][23]["views"], 3);

        let recent: Vec<_> = stats.recent.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(recent, vec!["/c", "/b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn later_ticks_see_new_views() {
        let state = state_with_views(&[]);
        let mut ticks = Box::pin(snapshot_ticks(state.clone(), 10));

        assert_eq!(ticks.next().await.unwrap().total_views, 0);

        let now = state.analytics.clock().now();
        state
            .analytics
            .record(PageViewEvent::new("/news/x", "", now, "10.0.0.1", UNKNOWN_LOCATION));

        // Paused clock auto-advances to the next interval
        let stats = ticks.next().await.unwrap();
        assert_eq!(stats.total_views, 1);
        assert_eq!(stats.recent[0].path, "/news/x");
    }
}
