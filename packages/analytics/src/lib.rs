#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-dimension accident aggregation, weighted severity scoring, and rate
//! normalization.
//!
//! Every function here reads an immutable slice of enriched records and
//! returns a freshly built table. Passes over different dimensions share no
//! state and may run in any order.

pub mod aggregate;
pub mod rates;
pub mod report;
pub mod severity;
pub mod temporal;

use us_accidents_analytics_models::GroupKey;

/// Errors that can occur during analytics operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// A per-group average or index was requested for a group with no
    /// records.
    #[error("Group '{group}' has no records")]
    EmptyGroup {
        /// The empty group.
        group: GroupKey,
    },

    /// A group has no entry in a population or area reference table.
    #[error("No {table} reference entry for '{key}'")]
    ReferenceLookup {
        /// Which kind of reference table was consulted.
        table: &'static str,
        /// The missing group identity.
        key: String,
    },

    /// Rates were requested over zero years.
    #[error("Cannot annualize counts over zero years")]
    ZeroYears,
}

/// Rounds half away from zero to the given number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use us_accidents_accident_models::{
        DayPhase, EnrichedRecord, Record, Severity, Timezone,
    };

    /// Builds an enriched record with the given grouping fields.
    pub fn accident(
        state: &str,
        timezone: Timezone,
        severity: u8,
        weather: &str,
        start: (i32, u32, u32, u32),
    ) -> EnrichedRecord {
        let (y, m, d, h) = start;
        EnrichedRecord::from_record(Record {
            id: format!("A-{state}-{y}{m:02}{d:02}{h:02}-{severity}"),
            state: state.to_string(),
            timezone,
            start_time: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
            severity: Severity::from_value(severity).unwrap(),
            weather_condition: weather.to_string(),
            start_lat: 40.0,
            start_lng: -83.0,
            sunrise_sunset: DayPhase::Day,
        })
    }

    /// A small mixed data set spanning both years and several groups.
    pub fn sample() -> Vec<EnrichedRecord> {
        vec![
            accident("OH", Timezone::Eastern, 0, "Clear", (2017, 1, 2, 8)),
            accident("OH", Timezone::Eastern, 0, "Light Rain", (2017, 1, 3, 8)),
            accident("OH", Timezone::Eastern, 2, "Clear", (2017, 2, 6, 17)),
            accident("TX", Timezone::Central, 3, "Clear", (2018, 2, 7, 17)),
            accident("TX", Timezone::Central, 2, "Overcast", (2018, 5, 8, 7)),
            accident("CA", Timezone::Pacific, 4, "Light Rain", (2018, 12, 31, 23)),
            accident("CA", Timezone::Pacific, 2, "Clear", (2017, 7, 4, 0)),
        ]
    }
}
