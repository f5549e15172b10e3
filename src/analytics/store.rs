use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::hourly::{self, HourlyBucket};
use super::PageViewEvent;

// ─── Configuration ───────────────────────────────────────────────

/// How many page views we keep before the oldest is evicted
pub const MAX_EVENTS: usize = 1000;

/// Trailing window (ms) that counts as "active now"
pub const ACTIVE_WINDOW_MS: i64 = 300_000;

/// Recent-feed length used by the stats endpoint unless overridden
pub const DEFAULT_RECENT_LIMIT: usize = 10;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe page-view store.
/// The track handler calls `record()`, the stats endpoints call `snapshot()`.
pub struct AnalyticsStore {
    events: RwLock<VecDeque<PageViewEvent>>,
    max_events: usize,
    offset: FixedOffset,
    clock: Arc<dyn Clock>,
}

/// Complete snapshot shipped to the dashboard on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Events currently held. Capped, not a lifetime total.
    pub total_views: u64,
    pub active_now: u64,
    #[serde(rename = "chartData")]
    pub hourly: Vec<HourlyBucket>,
    pub recent: Vec<PageViewEvent>,
}

// ─── AnalyticsStore impl ─────────────────────────────────────────

impl AnalyticsStore {
    /// Empty store on the system clock, labelling hours in UTC.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: RwLock::new(VecDeque::with_capacity(MAX_EVENTS + 1)),
            max_events: MAX_EVENTS,
            offset: Utc.fix(),
            clock,
        }
    }

    /// Override the eviction bound. A bound of zero is treated as one.
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events.max(1);
        self
    }

    /// Offset used to derive hour-of-day labels.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Append one event, evicting the single oldest if over the bound.
    pub fn record(&self, event: PageViewEvent) {
        let mut events = self.events.write();
        events.push_back(event);
        if events.len() > self.max_events {
            events.pop_front();
        }
    }

    /// Wipe all data.
    pub fn reset(&self) {
        self.events.write().clear();
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Newest `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<PageViewEvent> {
        let events = self.events.read();
        newest_first(&events, limit)
    }

    /// Snapshot as of the injected clock's current time.
    pub fn snapshot_now(&self, recent_limit: usize) -> Stats {
        self.snapshot(self.clock.now(), recent_limit)
    }

    /// Produce a read-only snapshot as of `now`.
    pub fn snapshot(&self, now: DateTime<Utc>, recent_limit: usize) -> Stats {
        let events = self.events.read();

        let active_now = events
            .iter()
            .filter(|e| (now - e.timestamp).num_milliseconds() < ACTIVE_WINDOW_MS)
            .count() as u64;

        Stats {
            total_views: events.len() as u64,
            active_now,
            hourly: hourly::rollup(events.iter(), now, &self.offset),
            recent: newest_first(&events, recent_limit),
        }
    }
}

impl Default for AnalyticsStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(events: &VecDeque<PageViewEvent>, limit: usize) -> Vec<PageViewEvent> {
    events.iter().rev().take(limit).cloned().collect()
}
