#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw table, cleaning report, and drop reason types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One untyped row of the source file, aligned with [`RawTable::headers`].
///
/// Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Cell values in header order.
    pub cells: Vec<Option<String>>,
}

impl RawRecord {
    /// Returns `true` if every cell at the given positions is empty.
    ///
    /// Positions past the end of the row count as empty.
    #[must_use]
    pub fn is_blank_in(&self, columns: &[usize]) -> bool {
        columns
            .iter()
            .all(|&i| self.cells.get(i).is_none_or(Option::is_none))
    }
}

/// The source file as read, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    /// Returns the position of the named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Why a row was excluded during cleaning.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DropReason {
    /// Every cell in the row was empty.
    EmptyRow,
    /// A required field was empty.
    MissingRequiredField,
    /// A present field could not be parsed into its typed form.
    Malformed,
    /// The start time fell outside the analysis window.
    OutOfWindowRecord,
}

/// Summary of what the cleaning stage removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    /// Number of columns in the source file.
    pub columns_before: usize,
    /// Number of columns dropped by projection.
    pub columns_removed: usize,
    /// Number of data rows in the source file.
    pub rows_before: usize,
    /// Number of rows that survived cleaning.
    pub rows_after: usize,
    /// Count of dropped rows per reason.
    pub dropped: BTreeMap<DropReason, usize>,
}

impl CleanReport {
    /// Total number of rows removed.
    #[must_use]
    pub const fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Number of rows dropped for the given reason.
    #[must_use]
    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    /// Records one dropped row.
    pub fn record_drop(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_row_detection() {
        let blank = RawRecord {
            cells: vec![None, None],
        };
        let partial = RawRecord {
            cells: vec![None, Some("OH".to_string())],
        };
        assert!(blank.is_blank_in(&[0, 1]));
        assert!(!partial.is_blank_in(&[0, 1]));
        assert!(partial.is_blank_in(&[0, 5]));
    }

    #[test]
    fn report_tallies_drops() {
        let mut report = CleanReport {
            rows_before: 5,
            rows_after: 2,
            ..CleanReport::default()
        };
        report.record_drop(DropReason::OutOfWindowRecord);
        report.record_drop(DropReason::OutOfWindowRecord);
        report.record_drop(DropReason::EmptyRow);
        assert_eq!(report.rows_removed(), 3);
        assert_eq!(report.dropped_for(DropReason::OutOfWindowRecord), 2);
        assert_eq!(report.dropped_for(DropReason::Malformed), 0);
    }
}
