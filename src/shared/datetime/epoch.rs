//! Epoch-relative arithmetic for the NATIVE temporal encodings.
//!
//! All functions are pure: they work on civil calendar values and never
//! consult process-wide time zone or formatter state.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// `NaiveDate::num_days_from_ce` of 2000-01-01.
pub const EPOCH_DAY_NUMBER: i32 = 730_120;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;
pub const SECONDS_PER_DAY: i32 = 86_400;

/// Whole days between `date` and 2000-01-01.
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - i64::from(EPOCH_DAY_NUMBER)
}

/// Microseconds since midnight. Leap-second nanos are clamped into the
/// last microsecond of the second.
pub fn micros_since_midnight(time: NaiveTime) -> i64 {
    let secs = i64::from(time.num_seconds_from_midnight());
    let micros = i64::from(time.nanosecond().min(999_999_999) / 1_000);
    secs * MICROS_PER_SECOND + micros
}

/// Microseconds between a wall-clock value and 2000-01-01 00:00:00 on the
/// same clock. None when the result does not fit in an i64.
pub fn micros_since_epoch(value: NaiveDateTime) -> Option<i64> {
    days_since_epoch(value.date())
        .checked_mul(MICROS_PER_DAY)?
        .checked_add(micros_since_midnight(value.time()))
}

/// Packs a TIMETZ value: upper 40 bits hold microseconds since UTC
/// midnight, lower 24 bits hold the UTC offset in seconds biased by +24h.
pub fn pack_time_tz(utc_time: NaiveTime, offset_seconds: i32) -> i64 {
    let biased = i64::from(offset_seconds + SECONDS_PER_DAY) & 0xFF_FFFF;
    (micros_since_midnight(utc_time) << 24) | biased
}

/// Inverse of [`pack_time_tz`]: (micros since UTC midnight, offset seconds).
pub fn unpack_time_tz(packed: i64) -> (i64, i32) {
    let micros = packed >> 24;
    let offset = (packed & 0xFF_FFFF) as i32 - SECONDS_PER_DAY;
    (micros, offset)
}
