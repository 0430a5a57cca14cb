//! Weighted severity scoring and severity distributions.
//!
//! Each severity level carries a fixed weight (see [`Severity::weight`]).
//! A group's weighted severity index is
//!
//! ```text
//! round( Σ count[s] × weight[s] / 310 / group_count × 1000 , 2 )
//! ```
//!
//! i.e. the weighted severity per accident scaled to a notional 1000
//! accidents, so groups of very different size can be compared.
//!
//! Per-group counts are kept in a map keyed by severity value. A group
//! lacking some levels simply has no entry for them.

use std::collections::{BTreeMap, BTreeSet};

use us_accidents_accident_models::{EnrichedRecord, Severity};
use us_accidents_analytics_models::{Dimension, GroupKey, SeverityBreakdown, SeverityShare};

use crate::{AnalyticsError, round_to};

/// Number of records at each severity level within one group.
pub type SeverityCounts = BTreeMap<Severity, u64>;

/// Tallies severity levels per group value.
#[must_use]
pub fn severity_counts_by(
    records: &[EnrichedRecord],
    dimension: Dimension,
) -> BTreeMap<GroupKey, SeverityCounts> {
    let mut groups: BTreeMap<GroupKey, SeverityCounts> = BTreeMap::new();
    for record in records {
        *groups
            .entry(dimension.key_of(record))
            .or_default()
            .entry(record.severity())
            .or_insert(0) += 1;
    }
    groups
}

/// Computes the weighted severity index per 1000 accidents for one group.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyGroup`] if `counts` sums to zero.
#[allow(clippy::cast_precision_loss)]
pub fn weighted_index(group: &GroupKey, counts: &SeverityCounts) -> Result<f64, AnalyticsError> {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return Err(AnalyticsError::EmptyGroup {
            group: group.clone(),
        });
    }

    let total_weighted: u64 = counts
        .iter()
        .map(|(severity, count)| count * u64::from(severity.weight()))
        .sum();

    let weighted = total_weighted as f64 / f64::from(Severity::TOTAL_WEIGHT);
    let per_accident = weighted / total as f64;
    Ok(round_to(per_accident * 1000.0, 2))
}

/// Computes the weighted severity index for every group of `dimension`.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyGroup`] if any group has no records.
pub fn weighted_severity_index(
    records: &[EnrichedRecord],
    dimension: Dimension,
) -> Result<BTreeMap<GroupKey, f64>, AnalyticsError> {
    severity_counts_by(records, dimension)
        .into_iter()
        .map(|(group, counts)| {
            let index = weighted_index(&group, &counts)?;
            Ok((group, index))
        })
        .collect()
}

/// Computes each group's share of every severity level seen in the data.
///
/// Levels absent from a group are reported with a zero count so every
/// breakdown lists the same levels in the same order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn severity_distribution(
    records: &[EnrichedRecord],
    dimension: Dimension,
) -> Vec<SeverityBreakdown> {
    let levels: BTreeSet<Severity> = records.iter().map(EnrichedRecord::severity).collect();

    severity_counts_by(records, dimension)
        .into_iter()
        .map(|(group_key, counts)| {
            let total: u64 = counts.values().sum();
            let levels = levels
                .iter()
                .map(|&severity| {
                    let count = counts.get(&severity).copied().unwrap_or(0);
                    SeverityShare {
                        severity,
                        count,
                        percent: round_to(count as f64 / total as f64 * 100.0, 1),
                    }
                })
                .collect();
            SeverityBreakdown {
                group_key,
                total,
                levels,
            }
        })
        .collect()
}
