use chrono::{DateTime, FixedOffset, TimeDelta, Timelike, Utc};
use serde::Serialize;

use super::PageViewEvent;

/// Number of hour-of-day slots in the chart series.
pub const HOURS_IN_SERIES: usize = 24;

/// Events older than this (ms) are left out of the hourly series.
pub const SERIES_WINDOW_MS: i64 = 86_400_000;

/// One point on the hourly chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    /// Hour-of-day label, e.g. "08:00"
    #[serde(rename = "time")]
    pub label: String,
    #[serde(rename = "views")]
    pub count: u64,
}

/// Hour-of-day of `ts` as seen in `offset`.
pub fn hour_of_day(ts: DateTime<Utc>, offset: &FixedOffset) -> usize {
    ts.with_timezone(offset).hour() as usize
}

pub fn hour_label(hour: usize) -> String {
    format!("{hour:02}:00")
}

/// Roll events up into the 24 slots ending at the current hour, oldest first.
///
/// Slots are keyed by hour-of-day only, so an event from yesterday at 08:xx
/// and one from today at 08:xx share a label. The 24h filter keeps the
/// previous cycle out of the count.
pub fn rollup<'a, I>(events: I, now: DateTime<Utc>, offset: &FixedOffset) -> Vec<HourlyBucket>
where
    I: IntoIterator<Item = &'a PageViewEvent>,
{
    let mut counts = [0u64; HOURS_IN_SERIES];
    for event in events {
        if (now - event.timestamp).num_milliseconds() < SERIES_WINDOW_MS {
            counts[hour_of_day(event.timestamp, offset)] += 1;
        }
    }

    (0..HOURS_IN_SERIES as i64)
        .rev()
        .map(|hours_ago| {
            let hour = hour_of_day(now - TimeDelta::hours(hours_ago), offset);
            HourlyBucket {
                label: hour_label(hour),
                count: counts[hour],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::UNKNOWN_LOCATION;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn event_at(ts: DateTime<Utc>) -> PageViewEvent {
        PageViewEvent::new("/", "", ts, "127.0.0.1", UNKNOWN_LOCATION)
    }

    #[test]
    fn empty_input_yields_24_zero_buckets_ending_at_current_hour() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let buckets = rollup(std::iter::empty(), now, &utc());

        assert_eq!(buckets.len(), HOURS_IN_SERIES);
        assert!(buckets.iter().all(|b| b.count == 0));
        assert_eq!(buckets.first().unwrap().label, "09:00");
        assert_eq!(buckets.last().unwrap().label, "08:00");
    }

    #[test]
    fn labels_wrap_around_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 1, 5, 0).unwrap();
        let labels: Vec<_> = rollup(std::iter::empty(), now, &utc())
            .into_iter()
            .map(|b| b.label)
            .collect();

        assert_eq!(labels[21], "23:00");
        assert_eq!(labels[22], "00:00");
        assert_eq!(labels[23], "01:00");
    }

    #[test]
    fn previous_cycle_with_same_label_is_excluded() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        // 07:30 yesterday and 07:30 today share the "07:00" label
        let events = vec![
            event_at(now - TimeDelta::hours(25)),
            event_at(now - TimeDelta::hours(1)),
        ];

        let buckets = rollup(&events, now, &utc());
        let seven = buckets.iter().find(|b| b.label == "07:00").unwrap();
        assert_eq!(seven.count, 1);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 1);
    }

    #[test]
    fn late_hour_yesterday_counts_toward_current_slot() {
        // 08:45 yesterday is still inside the window and keys as "08:00"
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let events = vec![event_at(now - TimeDelta::minutes(23 * 60 + 45))];

        let buckets = rollup(&events, now, &utc());
        assert_eq!(buckets[0].label, "09:00");
        assert_eq!(buckets[0].count, 0);
        assert_eq!(buckets[23].label, "08:00");
        assert_eq!(buckets[23].count, 1);
    }

    #[test]
    fn labels_follow_the_configured_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let kuwait = FixedOffset::east_opt(3 * 3600).unwrap();
        let events = vec![event_at(now)];

        let buckets = rollup(&events, now, &kuwait);
        let last = buckets.last().unwrap();
        assert_eq!(last.label, "11:00");
        assert_eq!(last.count, 1);
    }
}
