//! Calendar-day and minute arithmetic shared by the resolvers.
//!
//! All timestamps are naive local times as stored by the data source.
//! A "calendar day" is the half-open range `[00:00, next day 00:00)`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Start and exclusive end of the calendar day containing `date`.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Round a duration to the nearest whole minute.
///
/// Halves round up, so 90 seconds is 2 minutes and -90 seconds is
/// -1 minute.
pub fn whole_minutes(delta: Duration) -> i64 {
    (delta.num_milliseconds() as f64 / 60_000.0 + 0.5).floor() as i64
}

/// Minutes from `from` to `to`, rounded to the nearest minute.
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    whole_minutes(to - from)
}
