#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading, cleaning, and temporal enrichment of accident records.
//!
//! The stages run strictly in order and each returns a fresh value:
//!
//! 1. [`loader`] reads delimited text into a [`RawTable`].
//! 2. [`clean`] projects away unused columns and drops rows that cannot be
//!    aggregated, producing typed [`Record`]s.
//! 3. [`enrich`] derives calendar fields, producing [`EnrichedRecord`]s.
//!
//! Row-level defects never surface as errors; they are counted in the
//! [`CleanReport`]. Only I/O and CSV syntax failures are fatal.

pub mod clean;
pub mod enrich;
pub mod loader;
pub mod parsing;
pub mod progress;

use std::path::Path;
use std::sync::Arc;

use us_accidents_accident_models::{EnrichedRecord, Record};
use us_accidents_config::DateWindow;
pub use us_accidents_ingest_models::{CleanReport, DropReason, RawRecord, RawTable};

use crate::progress::ProgressCallback;

/// Errors that can occur while reading the source file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header row.
    #[error("Input contains no header row")]
    MissingHeader,
}

/// Output of the cleaning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecords {
    /// Rows that passed every check.
    pub records: Vec<Record>,
    /// What was removed and why.
    pub report: CleanReport,
}

/// Loads, cleans, and enriches the file at `path` in one call.
///
/// Returns the enriched records together with the cleaning report.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or parsed as CSV.
pub fn ingest_file(
    path: &Path,
    delimiter: u8,
    window: &DateWindow,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(Vec<EnrichedRecord>, CleanReport), IngestError> {
    let table = loader::load_csv(path, delimiter, progress)?;
    let CleanedRecords { records, report } = clean::clean(table, window);
    Ok((enrich::enrich(records), report))
}
