//! Calendar helpers.

use chrono::{DateTime, TimeZone, Utc};

/// Current time as Unix millis.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// True iff `last_pulse_at` falls on the same calendar day as `now`,
/// both read in `now`'s time zone.
pub fn has_posted_today<Tz: TimeZone>(last_pulse_at: Option<i64>, now: &DateTime<Tz>) -> bool {
    let Some(millis) = last_pulse_at else {
        return false;
    };
    match DateTime::from_timestamp_millis(millis) {
        Some(at) => at.with_timezone(&now.timezone()).date_naive() == now.date_naive(),
        None => false,
    }
}
