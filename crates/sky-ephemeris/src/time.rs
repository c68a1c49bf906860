//! UTC <-> Terrestrial Time conversions.
//!
//! All search arithmetic happens on TT Julian dates (a single `f64`), so
//! fixed-step grids are plain additions. Calendar UTC enters and leaves
//! exactly once, at the request boundary and when formatting event times.

use chrono::{DateTime, Utc};

/// TT - UTC in seconds: 32.184 s (TT - TAI) plus 37 leap seconds,
/// valid for 2017 onward.
pub const TT_MINUS_UTC_SECONDS: f64 = 69.184;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian date of the Unix epoch (1970-01-01T00:00:00 UTC).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian date of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;

/// UTC instant to a UTC-scale Julian date.
pub fn julian_date_utc(utc: DateTime<Utc>) -> f64 {
    let micros = utc.timestamp() as f64 * 1e6 + utc.timestamp_subsec_micros() as f64;
    UNIX_EPOCH_JD + micros / (SECONDS_PER_DAY * 1e6)
}

/// UTC instant to a TT Julian date.
pub fn tt_from_utc(utc: DateTime<Utc>) -> f64 {
    julian_date_utc(utc) + TT_MINUS_UTC_SECONDS / SECONDS_PER_DAY
}

/// TT Julian date back to a UTC-scale Julian date.
pub fn utc_jd_from_tt(tt_jd: f64) -> f64 {
    tt_jd - TT_MINUS_UTC_SECONDS / SECONDS_PER_DAY
}

/// TT Julian date back to a calendar UTC instant, microsecond resolution.
pub fn utc_from_tt(tt_jd: f64) -> DateTime<Utc> {
    let micros = ((utc_jd_from_tt(tt_jd) - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1e6).round() as i64;
    DateTime::<Utc>::from_timestamp_micros(micros).expect("TT julian date out of calendar range")
}
