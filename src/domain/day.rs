//! Calendar-day bucketing
//!
//! Every "same day" and "consecutive day" decision in the system goes
//! through the UTC day key produced here. Timestamps are stored as-is;
//! only comparisons are bucketed.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Truncate a timestamp to its UTC calendar day.
pub fn day_key(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Half-open `[start, end)` timestamp bounds of a UTC calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = start + chrono::Duration::days(1);
    (start, end)
}

/// Whole calendar days from `earlier` to `later` (negative if reversed).
pub fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (later - earlier).num_days()
}
