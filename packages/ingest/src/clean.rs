//! Cleaning stage: column projection and row validity rules.
//!
//! Rows are checked in a fixed order and counted against the first rule
//! they fail:
//!
//! 1. every cell empty after projection → [`DropReason::EmptyRow`]
//! 2. a required field empty → [`DropReason::MissingRequiredField`]
//! 3. a field present but unparseable → [`DropReason::Malformed`]
//! 4. start time outside the window → [`DropReason::OutOfWindowRecord`]
//!
//! Nothing here returns an error. Inconsistent upstream rows are excluded
//! and tallied in the [`CleanReport`].

use us_accidents_accident_models::Record;
use us_accidents_config::DateWindow;
use us_accidents_ingest_models::{CleanReport, DropReason, RawRecord, RawTable};

use crate::CleanedRecords;
use crate::parsing::{
    parse_coordinate, parse_day_phase, parse_severity, parse_start_time, parse_timezone,
};

/// Source columns not used by any analysis. Removed before row checks.
pub const DROPPED_COLUMNS: &[&str] = &[
    "End_Lat",
    "End_Lng",
    "End_Time",
    "Distance(mi)",
    "Number",
    "Street",
    "Side",
    "Wind_Chill(F)",
    "Wind_Direction",
    "Civil_Twilight",
    "Nautical_Twilight",
    "Astronomical_Twilight",
    "Temperature(F)",
    "Humidity(%)",
    "Pressure(in)",
    "Visibility(mi)",
];

/// Columns that must be non-empty for a row to be kept.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "ID",
    "State",
    "Start_Time",
    "Start_Lat",
    "Start_Lng",
    "Timezone",
    "Weather_Condition",
    "Sunrise_Sunset",
];

/// Column holding the severity level.
pub const SEVERITY_COLUMN: &str = "Severity";

/// Positions of the columns a [`Record`] is built from.
struct ColumnIndex {
    id: Option<usize>,
    state: Option<usize>,
    start_time: Option<usize>,
    start_lat: Option<usize>,
    start_lng: Option<usize>,
    timezone: Option<usize>,
    weather_condition: Option<usize>,
    sunrise_sunset: Option<usize>,
    severity: Option<usize>,
}

impl ColumnIndex {
    fn new(table: &RawTable) -> Self {
        Self {
            id: table.column_index("ID"),
            state: table.column_index("State"),
            start_time: table.column_index("Start_Time"),
            start_lat: table.column_index("Start_Lat"),
            start_lng: table.column_index("Start_Lng"),
            timezone: table.column_index("Timezone"),
            weather_condition: table.column_index("Weather_Condition"),
            sunrise_sunset: table.column_index("Sunrise_Sunset"),
            severity: table.column_index(SEVERITY_COLUMN),
        }
    }

    const fn required(&self) -> [Option<usize>; 8] {
        [
            self.id,
            self.state,
            self.start_time,
            self.start_lat,
            self.start_lng,
            self.timezone,
            self.weather_condition,
            self.sunrise_sunset,
        ]
    }
}

fn cell(row: &RawRecord, index: Option<usize>) -> Option<&str> {
    row.cells.get(index?)?.as_deref()
}

/// Checks one row against every rule and builds its typed record.
fn check_row(
    row: &RawRecord,
    columns: &ColumnIndex,
    kept: &[usize],
    window: &DateWindow,
) -> Result<Record, DropReason> {
    if row.is_blank_in(kept) {
        return Err(DropReason::EmptyRow);
    }

    if columns.required().iter().any(|&i| cell(row, i).is_none()) {
        return Err(DropReason::MissingRequiredField);
    }

    let text = |index| cell(row, index).ok_or(DropReason::Malformed);

    let start_time = parse_start_time(text(columns.start_time)?).ok_or(DropReason::Malformed)?;
    let record = Record {
        id: text(columns.id)?.to_owned(),
        state: text(columns.state)?.to_owned(),
        timezone: parse_timezone(text(columns.timezone)?).ok_or(DropReason::Malformed)?,
        start_time,
        severity: parse_severity(text(columns.severity)?).ok_or(DropReason::Malformed)?,
        weather_condition: text(columns.weather_condition)?.to_owned(),
        start_lat: parse_coordinate(text(columns.start_lat)?).ok_or(DropReason::Malformed)?,
        start_lng: parse_coordinate(text(columns.start_lng)?).ok_or(DropReason::Malformed)?,
        sunrise_sunset: parse_day_phase(text(columns.sunrise_sunset)?)
            .ok_or(DropReason::Malformed)?,
    };

    if !window.contains(&record.start_time) {
        return Err(DropReason::OutOfWindowRecord);
    }

    Ok(record)
}

/// Removes unused columns and invalid rows, returning typed records.
///
/// Consumes the raw table; the returned records are a new value.
#[must_use]
pub fn clean(table: RawTable, window: &DateWindow) -> CleanedRecords {
    let columns = ColumnIndex::new(&table);

    for name in REQUIRED_COLUMNS.iter().chain(std::iter::once(&SEVERITY_COLUMN)) {
        if table.column_index(name).is_none() {
            log::warn!("Input has no '{name}' column; every row will be dropped");
        }
    }

    let kept: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !DROPPED_COLUMNS.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut report = CleanReport {
        columns_before: table.headers.len(),
        columns_removed: table.headers.len() - kept.len(),
        rows_before: table.len(),
        ..CleanReport::default()
    };

    if table.is_empty() {
        log::warn!("Input has no data rows");
    }

    let mut records = Vec::with_capacity(table.len());
    for row in &table.rows {
        match check_row(row, &columns, &kept, window) {
            Ok(record) => records.push(record),
            Err(reason) => report.record_drop(reason),
        }
    }
    report.rows_after = records.len();

    log::info!(
        "Clean up done, Number of columns deleted: {}, Number of rows deleted: {}",
        report.columns_removed,
        report.rows_removed()
    );
    for (reason, count) in &report.dropped {
        log::debug!("  {reason}: {count} row(s)");
    }

    CleanedRecords { records, report }
}
