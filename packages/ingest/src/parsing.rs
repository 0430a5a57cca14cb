//! Field parsers for raw accident columns.
//!
//! Each parser returns `None` for values it cannot interpret; the cleaner
//! turns that into a [`DropReason::Malformed`](crate::DropReason::Malformed)
//! tally rather than an error.

use std::str::FromStr as _;

use chrono::NaiveDateTime;
use us_accidents_accident_models::{DayPhase, Severity, Timezone};

/// Parses a start time such as `"2016-02-08 05:46:00"`.
///
/// Fractional seconds and a `T` separator are also accepted.
#[must_use]
pub fn parse_start_time(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a coordinate, rejecting non-finite values.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a severity level written as an integer (`"2"`) or a float with a
/// zero fraction (`"2.0"`).
#[must_use]
pub fn parse_severity(s: &str) -> Option<Severity> {
    if let Ok(value) = s.parse::<u8>() {
        return Severity::from_value(value).ok();
    }
    let value = s.parse::<f64>().ok()?;
    if value.fract().abs() > f64::EPSILON || !(0.0..=4.0).contains(&value) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let level = value as u8;
    Severity::from_value(level).ok()
}

/// Parses a timezone name such as `"US/Eastern"`.
#[must_use]
pub fn parse_timezone(s: &str) -> Option<Timezone> {
    Timezone::from_str(s).ok()
}

/// Parses a `Sunrise_Sunset` value (`"Day"` or `"Night"`).
#[must_use]
pub fn parse_day_phase(s: &str) -> Option<DayPhase> {
    DayPhase::from_str(s).ok()
}
