//! Writes report tables to an output directory as JSON or CSV.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use serde::Serialize;
use us_accidents_analytics_models::{AccidentReport, MetricTable, SeverityBreakdown};
use us_accidents_ingest::CleanReport;
use us_accidents_ingest::progress::ProgressCallback;

/// Errors that can occur while writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// An I/O operation failed.
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File format for per-table output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

#[derive(Serialize)]
struct MetricRow {
    group: String,
    count: u64,
    mean_severity: f64,
    weighted_severity_index: Option<f64>,
    rate_per_year_per_1000_pop: Option<f64>,
    rate_per_year_per_1000_area: Option<f64>,
}

#[derive(Serialize)]
struct SeverityRow {
    group: String,
    severity: u8,
    count: u64,
    percent: f64,
}

#[derive(Serialize)]
struct MonthRow {
    year: i32,
    month: u32,
    count: u64,
}

#[derive(Serialize)]
struct HourRow {
    year_month: String,
    hour: usize,
    count: u64,
}

/// Number of files [`write_report`] produces.
#[must_use]
pub fn file_count(report: &AccidentReport) -> u64 {
    // tables + severity + monthly + hourly + report.json + clean_report.json
    report.tables.len() as u64 + 5
}

/// Writes every table of `report` into `dir`, creating it if needed.
///
/// Returns the paths written, in order.
///
/// # Errors
///
/// Returns [`OutputError`] if the directory or any file cannot be written.
pub fn write_report(
    dir: &Path,
    format: OutputFormat,
    report: &AccidentReport,
    clean_report: &CleanReport,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    let mut step = |path: PathBuf| {
        progress.set_message(format!("Wrote {}", path.display()));
        progress.inc(1);
        written.push(path);
    };

    for table in &report.tables {
        let path = table_path(dir, &table.dimension.table_name(), format);
        write_table(&path, format, table)?;
        step(path);
    }

    let path = table_path(dir, "severity_by_timezone", format);
    write_severity(&path, format, &report.severity_by_timezone)?;
    step(path);

    let path = table_path(dir, "monthly_by_year", format);
    match format {
        OutputFormat::Json => write_json(&path, &report.monthly_by_year)?,
        OutputFormat::Csv => write_csv(
            &path,
            report.monthly_by_year.iter().flat_map(|(&year, months)| {
                months.iter().map(move |m| MonthRow {
                    year,
                    month: m.month,
                    count: m.count,
                })
            }),
        )?,
    }
    step(path);

    let path = table_path(dir, "hourly_by_year_month", format);
    match format {
        OutputFormat::Json => write_json(&path, &report.hourly_by_year_month)?,
        OutputFormat::Csv => write_csv(
            &path,
            report.hourly_by_year_month.iter().flat_map(|series| {
                series
                    .counts
                    .iter()
                    .enumerate()
                    .map(move |(hour, &count)| HourRow {
                        year_month: series.year_month.to_string(),
                        hour,
                        count,
                    })
            }),
        )?,
    }
    step(path);

    let path = dir.join("report.json");
    write_json(&path, report)?;
    step(path);

    let path = dir.join("clean_report.json");
    write_json(&path, clean_report)?;
    step(path);

    progress.finish(format!("Wrote {} file(s) to {}", written.len(), dir.display()));
    Ok(written)
}

fn table_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

fn write_table(path: &Path, format: OutputFormat, table: &MetricTable) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => write_json(path, table),
        OutputFormat::Csv => write_csv(
            path,
            table.rows.iter().map(|row| MetricRow {
                group: row.group_key.to_string(),
                count: row.count,
                mean_severity: row.mean_severity,
                weighted_severity_index: row.weighted_severity_index,
                rate_per_year_per_1000_pop: row.rate_per_year_per_1000_pop,
                rate_per_year_per_1000_area: row.rate_per_year_per_1000_area,
            }),
        ),
    }
}

fn write_severity(
    path: &Path,
    format: OutputFormat,
    breakdowns: &[SeverityBreakdown],
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => write_json(path, breakdowns),
        OutputFormat::Csv => write_csv(
            path,
            breakdowns.iter().flat_map(|b| {
                b.levels.iter().map(move |level| SeverityRow {
                    group: b.group_key.to_string(),
                    severity: level.severity.value(),
                    count: level.count,
                    percent: level.percent,
                })
            }),
        ),
    }
}

fn create(path: &Path) -> Result<File, OutputError> {
    File::create(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    let file = create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

fn write_csv<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), OutputError> {
    let file = create(path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use us_accidents_analytics_models::{Dimension, GroupKey, GroupMetric, MonthCount};
    use tempfile::TempDir;
    use us_accidents_ingest::progress::null_progress;

    use super::*;

    fn report() -> AccidentReport {
        AccidentReport {
            total_records: 3,
            tables: vec![MetricTable {
                dimension: Dimension::State,
                rows: vec![GroupMetric {
                    group_key: GroupKey::State("OH".to_string()),
                    count: 3,
                    mean_severity: 0.667,
                    weighted_severity_index: Some(64.52),
                    rate_per_year_per_1000_pop: Some(0.001),
                    rate_per_year_per_1000_area: None,
                }],
            }],
            severity_by_timezone: Vec::new(),
            monthly_by_year: BTreeMap::from([(2017, vec![MonthCount { month: 1, count: 3 }])]),
            hourly_by_year_month: Vec::new(),
        }
    }

    #[test]
    fn csv_output_writes_one_file_per_table() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("out");
        let report = report();
        let written = write_report(
            &dir,
            OutputFormat::Csv,
            &report,
            &CleanReport::default(),
            &null_progress(),
        )
        .unwrap();
        assert_eq!(written.len() as u64, file_count(&report));
        assert_eq!(written[0], dir.join("by_state.csv"));

        let text = fs::read_to_string(dir.join("by_state.csv")).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "group,count,mean_severity,weighted_severity_index,\
                 rate_per_year_per_1000_pop,rate_per_year_per_1000_area"
            )
        );
        assert_eq!(lines.next(), Some("OH,3,0.667,64.52,0.001,"));

        let monthly = fs::read_to_string(dir.join("monthly_by_year.csv")).unwrap();
        assert_eq!(monthly, "year,month,count\n2017,1,3\n");
        assert!(dir.join("report.json").exists());
    }

    #[test]
    fn json_output_uses_camel_case_fields() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        write_report(
            &dir,
            OutputFormat::Json,
            &report(),
            &CleanReport::default(),
            &null_progress(),
        )
        .unwrap();
        let text = fs::read_to_string(dir.join("by_state.json")).unwrap();
        assert!(text.contains("\"weightedSeverityIndex\": 64.52"));
        assert!(text.contains("\"groupKey\": \"OH\""));
    }

    #[test]
    fn io_error_names_the_path() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("taken");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_report(
            &blocker,
            OutputFormat::Json,
            &report(),
            &CleanReport::default(),
            &null_progress(),
        )
        .unwrap_err();
        assert!(matches!(err, OutputError::Io { .. }));
        let message = err.to_string();
        assert!(message.starts_with("I/O error writing "), "{message}");
        assert!(message.contains("taken"), "{message}");
    }
}
