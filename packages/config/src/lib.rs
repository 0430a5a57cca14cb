#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analysis window and population/area reference configuration.
//!
//! [`AnalysisConfig`] bundles everything a run needs besides the accident
//! data itself: the inclusive date window records must fall into, the number
//! of years that window spans, and the reference tables used to normalize
//! counts into per-population and per-area rates.
//!
//! A default configuration for the 2017-2018 analysis is embedded at compile
//! time via [`include_str!`]. Callers may load their own from a TOML file.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike as _, NaiveDateTime};
use serde::Deserialize;

/// Default configuration embedded at compile time.
const DEFAULT_CONFIG_TOML: &str = include_str!("../reference/us_2017_2018.toml");

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML or does not match the schema.
    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The window's start is after its end.
    #[error("Date window is inverted: start {start} is after end {end}")]
    InvertedWindow {
        /// Configured window start.
        start: NaiveDateTime,
        /// Configured window end.
        end: NaiveDateTime,
    },

    /// `num_years` is zero.
    #[error("num_years must be at least 1")]
    ZeroYears,

    /// `num_years` disagrees with the number of years the window spans.
    #[error("num_years is {num_years} but the date window spans {window_years} calendar year(s)")]
    YearsMismatch {
        /// Configured number of years.
        num_years: u32,
        /// Number of calendar years covered by the window.
        window_years: u32,
    },

    /// A reference value is zero, negative, or not finite.
    #[error("Reference table '{table}' has a non-positive value for '{key}'")]
    NonPositiveReference {
        /// Name of the reference table.
        table: &'static str,
        /// Key whose value is invalid.
        key: String,
    },

    /// A reference table has no entries.
    #[error("Reference table '{table}' is empty")]
    EmptyReference {
        /// Name of the reference table.
        table: &'static str,
    },
}

/// Inclusive time window that accident start times must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DateWindow {
    /// Earliest accepted start time (inclusive).
    pub start: NaiveDateTime,
    /// Latest accepted start time (inclusive).
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Returns `true` if the timestamp lies within the window, bounds
    /// included.
    #[must_use]
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        *timestamp >= self.start && *timestamp <= self.end
    }

    /// Number of distinct calendar years the window touches.
    #[must_use]
    pub fn calendar_years(&self) -> u32 {
        let span = self.end.year() - self.start.year() + 1;
        u32::try_from(span).unwrap_or(0)
    }
}

/// Complete configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// Accepted range of accident start times.
    pub date_window: DateWindow,
    /// Number of years the window covers, used to annualize counts.
    pub num_years: u32,
    /// Population keyed by timezone name (e.g. `"US/Eastern"`).
    pub population_by_timezone: BTreeMap<String, u64>,
    /// Population keyed by two-letter state code.
    pub population_by_state: BTreeMap<String, u64>,
    /// Land area in square miles keyed by two-letter state code.
    pub area_by_state: BTreeMap<String, f64>,
}

impl AnalysisConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the embedded TOML is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML or does
    /// not match the expected schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading analysis config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads the file at `path` if given, otherwise the embedded default,
    /// and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::embedded()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field invariants the rate calculations depend on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = &self.date_window;
        if window.start > window.end {
            return Err(ConfigError::InvertedWindow {
                start: window.start,
                end: window.end,
            });
        }

        if self.num_years == 0 {
            return Err(ConfigError::ZeroYears);
        }

        let window_years = window.calendar_years();
        if self.num_years != window_years {
            return Err(ConfigError::YearsMismatch {
                num_years: self.num_years,
                window_years,
            });
        }

        check_population("population_by_timezone", &self.population_by_timezone)?;
        check_population("population_by_state", &self.population_by_state)?;

        if self.area_by_state.is_empty() {
            return Err(ConfigError::EmptyReference {
                table: "area_by_state",
            });
        }
        if let Some((key, _)) = self
            .area_by_state
            .iter()
            .find(|(_, area)| !(area.is_finite() && **area > 0.0))
        {
            return Err(ConfigError::NonPositiveReference {
                table: "area_by_state",
                key: key.clone(),
            });
        }

        Ok(())
    }
}

fn check_population(
    table: &'static str,
    values: &BTreeMap<String, u64>,
) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::EmptyReference { table });
    }
    if let Some((key, _)) = values.iter().find(|(_, population)| **population == 0) {
        return Err(ConfigError::NonPositiveReference {
            table,
            key: key.clone(),
        });
    }
    Ok(())
}
