pub mod clock;
pub mod hourly;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use hourly::HourlyBucket;
pub use store::{AnalyticsStore, Stats};

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use serde::{Serialize, Serializer};

/// Placeholder used when no geo-hint headers reach the ingestion boundary.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// A single page visit as held by the store.
/// This is the "write" side: the track handler builds these and pushes them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageViewEvent {
    /// Visited route, never empty ("/" when the client sent nothing)
    pub path: String,
    /// Free-form referrer, may be empty
    pub referrer: String,
    /// Server-assigned arrival time, millisecond precision
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
    /// Best-effort client address
    pub ip: String,
    /// "City, CountryCode" or [`UNKNOWN_LOCATION`]
    pub location: String,
}

impl PageViewEvent {
    /// Build an event, normalising the path and truncating the timestamp
    /// to whole milliseconds.
    pub fn new(
        path: impl Into<String>,
        referrer: impl Into<String>,
        timestamp: DateTime<Utc>,
        ip: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let path = if path.trim().is_empty() {
            "/".to_string()
        } else {
            path
        };

        Self {
            path,
            referrer: referrer.into(),
            timestamp: truncate_to_millis(timestamp),
            ip: ip.into(),
            location: location.into(),
        }
    }
}

fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(ts)
}

fn serialize_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
