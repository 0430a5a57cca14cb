#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident record types, severity levels, and timezone definitions.
//!
//! This crate defines the canonical typed accident record produced by the
//! cleaning stage and the enriched record consumed by every aggregation
//! pass. All raw source columns are parsed into these types exactly once.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity level for an accident, from 0 (negligible) to 4 (most severe).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Severity {
    /// Level 0: negligible impact on traffic
    #[strum(serialize = "0")]
    Negligible = 0,
    /// Level 1: minor impact, short delay
    #[strum(serialize = "1")]
    Minor = 1,
    /// Level 2: moderate impact
    #[strum(serialize = "2")]
    Moderate = 2,
    /// Level 3: significant impact, long delay
    #[strum(serialize = "3")]
    Significant = 3,
    /// Level 4: severe impact on traffic
    #[strum(serialize = "4")]
    Severe = 4,
}

impl Severity {
    /// Sum of every level's weight.
    pub const TOTAL_WEIGHT: u32 = 310;

    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns the fixed scoring weight for this level.
    ///
    /// Each level weighs twice as much as the one below it.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Negligible => 10,
            Self::Minor => 20,
            Self::Moderate => 40,
            Self::Significant => 80,
            Self::Severe => 160,
        }
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 0-4.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            0 => Ok(Self::Negligible),
            1 => Ok(Self::Minor),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Significant),
            4 => Ok(Self::Severe),
            _ => Err(InvalidSeverityError { value }),
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Negligible,
            Self::Minor,
            Self::Moderate,
            Self::Significant,
            Self::Severe,
        ]
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.value()
    }
}

impl TryFrom<u8> for Severity {
    type Error = InvalidSeverityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Error returned when attempting to create a [`Severity`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid severity value {}: expected 0-4", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// The four continental US timezones present in the accident data.
///
/// Variants are declared in alphabetical order of their names so the derived
/// ordering matches sorting by name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Timezone {
    /// `US/Central`
    #[serde(rename = "US/Central")]
    #[strum(serialize = "US/Central")]
    Central,
    /// `US/Eastern`
    #[serde(rename = "US/Eastern")]
    #[strum(serialize = "US/Eastern")]
    Eastern,
    /// `US/Mountain`
    #[serde(rename = "US/Mountain")]
    #[strum(serialize = "US/Mountain")]
    Mountain,
    /// `US/Pacific`
    #[serde(rename = "US/Pacific")]
    #[strum(serialize = "US/Pacific")]
    Pacific,
}

impl Timezone {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Central, Self::Eastern, Self::Mountain, Self::Pacific]
    }
}

/// Whether an accident happened between sunrise and sunset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DayPhase {
    /// Between sunrise and sunset.
    Day,
    /// Between sunset and sunrise.
    Night,
}

/// Day of the week, ordered Monday first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DayOfWeek {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// A calendar month within a specific year.
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month of the year (1-12).
    pub month: u32,
}

impl YearMonth {
    /// Returns the period containing the given timestamp.
    #[must_use]
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A cleaned accident record with every required field present and typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Source identifier (e.g. `"A-1"`).
    pub id: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Timezone the accident was recorded in.
    pub timezone: Timezone,
    /// Local start time, interpreted as-is.
    pub start_time: NaiveDateTime,
    /// Severity level.
    pub severity: Severity,
    /// Free-text weather description (e.g. `"Light Rain"`).
    pub weather_condition: String,
    /// Start latitude.
    pub start_lat: f64,
    /// Start longitude.
    pub start_lng: f64,
    /// Day or night at the time of the accident.
    pub sunrise_sunset: DayPhase,
}

/// A [`Record`] with calendar fields derived from its start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    /// The underlying cleaned record.
    #[serde(flatten)]
    pub record: Record,
    /// Calendar year.
    pub year: i32,
    /// Month of the year (1-12).
    pub month: u32,
    /// Hour of the day (0-23).
    pub hour: u32,
    /// Year and month period.
    pub year_month: YearMonth,
    /// Day of the week.
    pub weekday: DayOfWeek,
}

impl EnrichedRecord {
    /// Derives the calendar fields from the record's start time.
    #[must_use]
    pub fn from_record(record: Record) -> Self {
        let start = record.start_time;
        Self {
            year: start.year(),
            month: start.month(),
            hour: start.hour(),
            year_month: YearMonth::of(&start),
            weekday: start.weekday().into(),
            record,
        }
    }

    /// Severity level of the underlying record.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.record.severity
    }
}
