#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the US accident analysis pipeline.
//!
//! Loads the accident CSV, cleans and enriches it, computes the per-dimension
//! metric tables, and writes them to an output directory.

mod output;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use us_accidents_analytics::report::build_report;
use us_accidents_cli_utils::{IndicatifProgress, MultiProgress, init_logger};
use us_accidents_config::AnalysisConfig;
use us_accidents_ingest::ingest_file;

use crate::output::{OutputFormat, file_count, write_report};

#[derive(Parser)]
#[command(name = "us_accidents", about = "US traffic accident analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over an accident CSV and write the report tables
    Analyze {
        /// Path to the accident CSV file
        #[arg(long)]
        input: PathBuf,
        /// Analysis configuration TOML. Uses the embedded 2017-2018
        /// configuration if not specified.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory to write report files into
        #[arg(long, default_value = "output")]
        output: PathBuf,
        /// File format for the per-table output
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Field delimiter of the input file
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
    /// Load and validate a configuration, then print a summary of it
    CheckConfig {
        /// Analysis configuration TOML. Checks the embedded configuration
        /// if not specified.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            config,
            output,
            format,
            delimiter,
        } => {
            let delimiter = u8::try_from(delimiter)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| format!("Delimiter must be a single ASCII character, got {delimiter:?}"))?;
            analyze(&multi, &input, config.as_deref(), &output, format, delimiter)?;
        }
        Commands::CheckConfig { config } => {
            let config = AnalysisConfig::load(config.as_deref())?;
            println!(
                "Date window:     {} .. {}",
                config.date_window.start, config.date_window.end
            );
            println!("Years:           {}", config.num_years);
            println!(
                "Timezones:       {} population entries",
                config.population_by_timezone.len()
            );
            println!(
                "States:          {} population entries, {} area entries",
                config.population_by_state.len(),
                config.area_by_state.len()
            );
        }
    }

    Ok(())
}

fn analyze(
    multi: &MultiProgress,
    input: &Path,
    config: Option<&Path>,
    output: &Path,
    format: OutputFormat,
    delimiter: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let config = AnalysisConfig::load(config)?;
    log::info!(
        "Analyzing {} for {} .. {}",
        input.display(),
        config.date_window.start,
        config.date_window.end
    );

    let progress = IndicatifProgress::records_bar(multi, "Reading accident records");
    let (records, clean_report) = ingest_file(input, delimiter, &config.date_window, &progress)?;
    log::info!(
        "{} of {} rows kept ({} removed)",
        clean_report.rows_after,
        clean_report.rows_before,
        clean_report.rows_removed()
    );

    let report = build_report(&records, &config)?;

    let progress = IndicatifProgress::steps_bar(multi, "Writing tables", file_count(&report));
    let written = write_report(output, format, &report, &clean_report, &progress)?;

    log::info!(
        "Wrote {} file(s) to {} in {:.1}s",
        written.len(),
        output.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
