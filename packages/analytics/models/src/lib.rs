#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grouping dimensions and metric table types.
//!
//! These are the terminal outputs of the pipeline. A report renderer
//! consumes them as-is (typically as JSON or CSV); nothing downstream of
//! the analytics crate mutates them.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use us_accidents_accident_models::{DayOfWeek, EnrichedRecord, Severity, Timezone, YearMonth};

/// A categorical field records can be grouped by.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    /// `Timezone` column.
    Timezone,
    /// `State` column.
    State,
    /// `Weather_Condition` column.
    Weather,
    /// Hour of the start time.
    Hour,
    /// Weekday of the start time.
    Weekday,
    /// Month of the start time, across years.
    Month,
    /// Year and month of the start time.
    YearMonth,
}

impl Dimension {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Timezone,
            Self::State,
            Self::Weather,
            Self::Hour,
            Self::Weekday,
            Self::Month,
            Self::YearMonth,
        ]
    }

    /// Extracts this dimension's group key from a record.
    #[must_use]
    pub fn key_of(self, record: &EnrichedRecord) -> GroupKey {
        match self {
            Self::Timezone => GroupKey::Timezone(record.record.timezone),
            Self::State => GroupKey::State(record.record.state.clone()),
            Self::Weather => GroupKey::Weather(record.record.weather_condition.clone()),
            Self::Hour => GroupKey::Hour(record.hour),
            Self::Weekday => GroupKey::Weekday(record.weekday),
            Self::Month => GroupKey::Month(record.month),
            Self::YearMonth => GroupKey::YearMonth(record.year_month),
        }
    }

    /// Row order used for this dimension's report table.
    ///
    /// State and weather tables lead with the most frequent values; every
    /// other dimension reads naturally in key order.
    #[must_use]
    pub const fn report_order(self) -> SortOrder {
        match self {
            Self::State | Self::Weather => SortOrder::CountDescending,
            Self::Timezone | Self::Hour | Self::Weekday | Self::Month | Self::YearMonth => {
                SortOrder::KeyAscending
            }
        }
    }

    /// File stem for this dimension's table (e.g. `"by_timezone"`).
    #[must_use]
    pub fn table_name(self) -> String {
        format!("by_{self}")
    }
}

/// The value of one [`Dimension`] for a group of records.
///
/// Keys from the same dimension compare by their payload, so a sorted
/// table is in natural order: timezones and text alphabetically, hours and
/// months numerically, weekdays Monday first, periods chronologically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// A timezone.
    Timezone(Timezone),
    /// A two-letter state code.
    State(String),
    /// A weather description.
    Weather(String),
    /// An hour of the day (0-23).
    Hour(u32),
    /// A day of the week.
    Weekday(DayOfWeek),
    /// A month of the year (1-12).
    Month(u32),
    /// A year-month period.
    YearMonth(YearMonth),
}

impl GroupKey {
    /// The identity used to look this group up in a reference table
    /// (timezone name or state code).
    #[must_use]
    pub fn reference_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timezone(tz) => write!(f, "{tz}"),
            Self::State(s) | Self::Weather(s) => write!(f, "{s}"),
            Self::Hour(h) | Self::Month(h) => write!(f, "{h}"),
            Self::Weekday(d) => write!(f, "{d}"),
            Self::YearMonth(p) => write!(f, "{p}"),
        }
    }
}

/// How the rows of an aggregate are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// By group key, ascending.
    #[default]
    KeyAscending,
    /// By count, largest first; ties by key ascending.
    CountDescending,
}

/// Count and mean severity for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    /// Group value.
    pub key: GroupKey,
    /// Number of records in the group.
    pub count: u64,
    /// Mean severity, rounded to 3 decimals.
    pub mean_severity: f64,
}

/// Every metric computed for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetric {
    /// Group value.
    pub group_key: GroupKey,
    /// Number of records in the group.
    pub count: u64,
    /// Mean severity, rounded to 3 decimals.
    pub mean_severity: f64,
    /// Weighted severity index per 1000 accidents, rounded to 2 decimals.
    pub weighted_severity_index: Option<f64>,
    /// Accidents per year per 1000 residents, rounded to 3 decimals.
    pub rate_per_year_per_1000_pop: Option<f64>,
    /// Accidents per year per 1000 square miles, rounded to 3 decimals.
    pub rate_per_year_per_1000_area: Option<f64>,
}

impl GroupMetric {
    /// Returns the value of the given metric, if computed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, metric: RankMetric) -> Option<f64> {
        match metric {
            RankMetric::Count => Some(self.count as f64),
            RankMetric::MeanSeverity => Some(self.mean_severity),
            RankMetric::WeightedSeverityIndex => self.weighted_severity_index,
            RankMetric::RatePerPopulation => self.rate_per_year_per_1000_pop,
            RankMetric::RatePerArea => self.rate_per_year_per_1000_area,
        }
    }
}

/// A metric that table rows can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RankMetric {
    /// Number of records.
    Count,
    /// Mean severity.
    MeanSeverity,
    /// Weighted severity index.
    WeightedSeverityIndex,
    /// Rate per 1000 residents.
    RatePerPopulation,
    /// Rate per 1000 square miles.
    RatePerArea,
}

/// All group metrics for one dimension, in report order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTable {
    /// Dimension the rows are grouped by.
    pub dimension: Dimension,
    /// One row per group present in the data.
    pub rows: Vec<GroupMetric>,
}

impl MetricTable {
    /// Returns the first `n` rows.
    #[must_use]
    pub fn top(&self, n: usize) -> &[GroupMetric] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Returns the rows ordered by `metric`, largest first.
    ///
    /// Rows without a value for the metric go last; ties keep key order.
    #[must_use]
    pub fn ranked_by(&self, metric: RankMetric) -> Vec<&GroupMetric> {
        let mut rows: Vec<&GroupMetric> = self.rows.iter().collect();
        rows.sort_by(|a, b| match (a.value(metric), b.value(metric)) {
            (Some(x), Some(y)) => y
                .total_cmp(&x)
                .then_with(|| a.group_key.cmp(&b.group_key)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.group_key.cmp(&b.group_key),
        });
        rows
    }

    /// Sum of counts across all rows.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }
}

/// Count and share of one severity level within a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityShare {
    /// Severity level.
    pub severity: Severity,
    /// Records at this level.
    pub count: u64,
    /// Share of the group's records, as a percentage rounded to 1 decimal.
    pub percent: f64,
}

/// Severity distribution for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityBreakdown {
    /// Group value.
    pub group_key: GroupKey,
    /// Records in the group.
    pub total: u64,
    /// One entry per severity level seen anywhere in the data, ascending.
    pub levels: Vec<SeverityShare>,
}

/// Count for one month of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    /// Month of the year (1-12).
    pub month: u32,
    /// Number of records.
    pub count: u64,
}

/// Records per hour of the day within one year-month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySeries {
    /// Period the counts belong to.
    pub year_month: YearMonth,
    /// Exactly 24 counts, index = hour.
    pub counts: Vec<u64>,
}

/// Everything the pipeline hands to a report renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentReport {
    /// Number of enriched records the report was built from.
    pub total_records: u64,
    /// One table per dimension, in [`Dimension::all`] order.
    pub tables: Vec<MetricTable>,
    /// Severity distribution per timezone.
    pub severity_by_timezone: Vec<SeverityBreakdown>,
    /// Month-by-month counts for each year.
    pub monthly_by_year: BTreeMap<i32, Vec<MonthCount>>,
    /// Hour-of-day counts for each year-month.
    pub hourly_by_year_month: Vec<HourlySeries>,
}

impl AccidentReport {
    /// Returns the table for the given dimension.
    #[must_use]
    pub fn table(&self, dimension: Dimension) -> Option<&MetricTable> {
        self.tables.iter().find(|t| t.dimension == dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(state: &str, count: u64, index: Option<f64>) -> GroupMetric {
        GroupMetric {
            group_key: GroupKey::State(state.to_string()),
            count,
            mean_severity: 2.0,
            weighted_severity_index: index,
            rate_per_year_per_1000_pop: None,
            rate_per_year_per_1000_area: None,
        }
    }

    #[test]
    fn group_keys_sort_naturally() {
        let mut days = vec![
            GroupKey::Weekday(DayOfWeek::Sunday),
            GroupKey::Weekday(DayOfWeek::Monday),
            GroupKey::Weekday(DayOfWeek::Friday),
        ];
        days.sort();
        assert_eq!(days[0], GroupKey::Weekday(DayOfWeek::Monday));
        assert_eq!(days[2], GroupKey::Weekday(DayOfWeek::Sunday));

        let mut hours = vec![GroupKey::Hour(10), GroupKey::Hour(2), GroupKey::Hour(23)];
        hours.sort();
        assert_eq!(hours, vec![GroupKey::Hour(2), GroupKey::Hour(10), GroupKey::Hour(23)]);
    }

    #[test]
    fn reference_id_uses_source_names() {
        assert_eq!(
            GroupKey::Timezone(Timezone::Mountain).reference_id(),
            "US/Mountain"
        );
        assert_eq!(GroupKey::State("TX".to_string()).reference_id(), "TX");
    }

    #[test]
    fn table_names() {
        assert_eq!(Dimension::Timezone.table_name(), "by_timezone");
        assert_eq!(Dimension::YearMonth.table_name(), "by_year_month");
    }

    #[test]
    fn keys_serialize_as_plain_values() {
        let json = serde_json::to_string(&vec![
            GroupKey::Timezone(Timezone::Eastern),
            GroupKey::Hour(7),
            GroupKey::YearMonth(YearMonth {
                year: 2018,
                month: 3,
            }),
        ])
        .unwrap();
        assert_eq!(json, r#"["US/Eastern",7,"2018-03"]"#);
    }

    #[test]
    fn ranked_by_puts_missing_values_last() {
        let table = MetricTable {
            dimension: Dimension::State,
            rows: vec![
                metric("AZ", 10, Some(50.0)),
                metric("CA", 30, None),
                metric("OH", 20, Some(70.0)),
            ],
        };
        let ranked: Vec<String> = table
            .ranked_by(RankMetric::WeightedSeverityIndex)
            .iter()
            .map(|m| m.group_key.to_string())
            .collect();
        assert_eq!(ranked, vec!["OH", "AZ", "CA"]);
        assert_eq!(table.total_count(), 60);
        assert_eq!(table.top(2).len(), 2);
        assert_eq!(table.top(10).len(), 3);
    }
}
