//! Date helpers shared by the person model and the record generators.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// The fixed "current" instant all generation is anchored to.
///
/// A constant in 2019 is used instead of the wall clock so that data
/// generated from the same seed never varies between runs.
pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 7, 5)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .expect("hardcoded anchor date is valid")
}

/// Returns a random date inclusive of the lower bound and exclusive of the
/// upper bound, uniform at second granularity.
pub fn random_date(from: NaiveDateTime, to: NaiveDateTime, rng: &mut ChaCha8Rng) -> NaiveDateTime {
    let range = (to - from).num_seconds();
    assert!(range >= 0, "date range is reversed: {from} .. {to}");
    from + Duration::seconds((rng.gen::<f64>() * range as f64) as i64)
}

/// Returns a random date on or after `after`, up to the fixed anchor.
pub fn random_date_after(after: NaiveDateTime, rng: &mut ChaCha8Rng) -> NaiveDateTime {
    random_date(after, now(), rng)
}

/// Shifts a date by whole years, pinning 29 February onto 28 February in
/// non-leap years.
pub fn add_years(date: NaiveDateTime, years: i32) -> NaiveDateTime {
    let target_year = date.year() + years;
    date.with_year(target_year).unwrap_or_else(|| {
        date.with_day(28)
            .and_then(|d| d.with_year(target_year))
            .expect("day 28 exists in every month of every year")
    })
}

pub fn max_date(a: NaiveDateTime, b: NaiveDateTime) -> NaiveDateTime {
    if a > b {
        a
    } else {
        b
    }
}

pub fn min_date(a: NaiveDateTime, b: NaiveDateTime) -> NaiveDateTime {
    if a < b {
        a
    } else {
        b
    }
}
