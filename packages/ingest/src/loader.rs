//! Delimited-text loader.
//!
//! Reads the header row and every data row into a [`RawTable`] without
//! interpreting any values. Cells are trimmed and empty cells become `None`.
//! Rows shorter than the header are padded with `None`; extra trailing cells
//! are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use us_accidents_ingest_models::{RawRecord, RawTable};

use crate::IngestError;
use crate::progress::ProgressCallback;

/// Number of rows between progress updates.
const PROGRESS_BATCH: u64 = 10_000;

/// Opens and reads the file at `path`.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be opened, is not valid CSV,
/// or has no header row.
pub fn load_csv(
    path: &Path,
    delimiter: u8,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RawTable, IngestError> {
    log::info!("Input file is: {}", path.display());
    let file = File::open(path)?;
    load_reader(BufReader::new(file), delimiter, progress)
}

/// Reads delimited text from any reader.
///
/// # Errors
///
/// Returns [`IngestError`] if the text is not valid CSV or has no header row.
pub fn load_reader<R: Read>(
    reader: R,
    delimiter: u8,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RawTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(IngestError::MissingHeader);
    }

    progress.set_message("Reading accident records".to_string());

    let mut rows = Vec::new();
    let mut pending = 0u64;

    for result in reader.records() {
        let record = result?;
        let cells = (0..headers.len())
            .map(|i| {
                record
                    .get(i)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(ToOwned::to_owned)
            })
            .collect();
        rows.push(RawRecord { cells });

        pending += 1;
        if pending == PROGRESS_BATCH {
            progress.inc(pending);
            pending = 0;
        }
    }
    progress.inc(pending);

    log::info!(
        "Read {} rows with {} columns",
        rows.len(),
        headers.len()
    );
    progress.finish(format!("Read {} rows", rows.len()));

    Ok(RawTable { headers, rows })
}
