use super::epoch::{
    EPOCH_DAY_NUMBER, days_since_epoch, micros_since_epoch, micros_since_midnight, pack_time_tz,
    unpack_time_tz,
};
use chrono::{Datelike, NaiveDate, NaiveTime};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn epoch_day_number_matches_chrono() {
    assert_eq!(date(2000, 1, 1).num_days_from_ce(), EPOCH_DAY_NUMBER);
}

#[test]
fn days_since_epoch_matches_reference_values() {
    assert_eq!(days_since_epoch(date(2000, 1, 1)), 0);
    assert_eq!(days_since_epoch(date(2015, 3, 20)), 5557);
    assert_eq!(days_since_epoch(date(1990, 2, 28)), -3594);
}

#[test]
fn micros_since_epoch_matches_reference_values() {
    let at = |y, m, d, h| date(y, m, d).and_hms_opt(h, 0, 0).unwrap();

    assert_eq!(micros_since_epoch(at(2000, 1, 1, 0)), Some(0));
    assert_eq!(micros_since_epoch(at(2000, 1, 1, 11)), Some(39_600_000_000));
    assert_eq!(
        micros_since_epoch(at(1990, 2, 28, 2)),
        Some(-310_514_400_000_000)
    );
    assert_eq!(
        micros_since_epoch(at(2015, 3, 20, 1)),
        Some(480_128_400_000_000)
    );
}

#[test]
fn micros_since_midnight_keeps_sub_second_precision() {
    let t = NaiveTime::from_hms_micro_opt(1, 2, 3, 456_789).unwrap();
    assert_eq!(micros_since_midnight(t), 3_723_456_789);
}

#[test]
fn pack_time_tz_biases_offset_and_roundtrips() {
    let t = NaiveTime::from_hms_opt(10, 30, 0).unwrap();

    let utc = pack_time_tz(t, 0);
    assert_eq!(utc & 0xFF_FFFF, 86_400);
    assert_eq!(utc >> 24, 37_800_000_000);

    // Negative offsets stay non-negative once biased.
    let hawaii = pack_time_tz(t, -10 * 3600);
    assert_eq!(hawaii & 0xFF_FFFF, 50_400);
    assert_eq!(unpack_time_tz(hawaii), (37_800_000_000, -36_000));

    let kiritimati = pack_time_tz(t, 14 * 3600);
    assert_eq!(unpack_time_tz(kiritimati), (37_800_000_000, 50_400));
}
