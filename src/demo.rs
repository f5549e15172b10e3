use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::time::Instant;

use crate::analytics::{AnalyticsStore, PageViewEvent};

// ─── Pools ───────────────────────────────────────────────────────

static SECTIONS: &[&str] = &[
    "news", "gulf", "kerala", "business", "sports", "tech", "health", "lifestyle",
];

static SLUGS: &[&str] = &[
    "visa-rules-updated",
    "fuel-prices-revised",
    "monsoon-alert",
    "expat-remittances-rise",
    "new-metro-line",
    "cricket-final-tonight",
    "school-calendar-announced",
    "airport-expansion",
    "gold-rate-today",
    "heatwave-advisory",
];

static REFERRERS: &[&str] = &[
    "",
    "",
    "https://www.google.com/",
    "https://www.facebook.com/",
    "https://t.co/",
    "https://www.instagram.com/",
    "https://web.whatsapp.com/",
];

static LOCATIONS: &[&str] = &[
    "Kuwait City, KW",
    "Salmiya, KW",
    "Hawalli, KW",
    "Kochi, IN",
    "Thiruvananthapuram, IN",
    "Dubai, AE",
    "Doha, QA",
    "Unknown Location",
];

// ─── Public entry point ──────────────────────────────────────────

/// Load `count` synthetic page views spread over the 24 hours before `now`.
///
/// Events are generated oldest first so the store's arrival order stays
/// chronological. Seeding is deterministic so re-runs produce the same data.
pub fn seed(store: &AnalyticsStore, count: usize, now: DateTime<Utc>) {
    if count == 0 {
        return;
    }
    let start = Instant::now();

    let mut rng = StdRng::seed_from_u64(42);
    let span_ms = TimeDelta::hours(24).num_milliseconds();

    let mut offsets: Vec<i64> = (0..count).map(|_| rng.gen_range(0..span_ms)).collect();
    // Largest offset first == oldest first
    offsets.sort_unstable_by(|a, b| b.cmp(a));

    for offset_ms in offsets {
        let section = SECTIONS[rng.gen_range(0..SECTIONS.len())];
        let slug = SLUGS[rng.gen_range(0..SLUGS.len())];
        let path = if rng.gen_bool(0.15) {
            "/".to_string()
        } else {
            format!("/{section}/{slug}")
        };

        store.record(PageViewEvent::new(
            path,
            REFERRERS[rng.gen_range(0..REFERRERS.len())],
            now - TimeDelta::milliseconds(offset_ms),
            format!("10.{}.{}.{}", rng.gen_range(0u8..=255), rng.gen_range(0u8..=255), rng.gen_range(1u8..=254)),
            LOCATIONS[rng.gen_range(0..LOCATIONS.len())],
        ));
    }

    tracing::info!(
        count,
        held = store.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "seeded demo page views"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::ManualClock;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn seeded_events_are_chronological_and_within_a_day() {
        let store = AnalyticsStore::with_clock(Arc::new(ManualClock::new(now())));
        seed(&store, 300, now());

        let newest_first = store.recent(usize::MAX);
        assert_eq!(newest_first.len(), 300);
        assert!(newest_first
            .windows(2)
            .all(|w| w[0].timestamp >= w[1].timestamp));
        assert!(newest_first
            .iter()
            .all(|e| now() - e.timestamp <= TimeDelta::hours(24)));
    }

    #[test]
    fn seeding_is_deterministic() {
        let a = AnalyticsStore::new();
        let b = AnalyticsStore::new();
        seed(&a, 50, now());
        seed(&b, 50, now());
        assert_eq!(a.recent(50), b.recent(50));
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let store = AnalyticsStore::new();
        seed(&store, 0, now());
        assert!(store.is_empty());
    }
}
