//! Dimensional aggregation: record count and mean severity per group.
//!
//! Only values present in the data produce rows. A dimension value that
//! exists in a reference table but not in the records is never zero-filled.

use std::collections::BTreeMap;

use us_accidents_accident_models::EnrichedRecord;
use us_accidents_analytics_models::{Dimension, GroupCount, GroupKey, SortOrder};

use crate::round_to;

/// Counts records per group value, keyed in ascending order.
#[must_use]
pub fn counts_by(records: &[EnrichedRecord], dimension: Dimension) -> BTreeMap<GroupKey, u64> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(dimension.key_of(record)).or_insert(0) += 1;
    }
    counts
}

/// Groups records by `dimension` and returns each group's count and mean
/// severity (rounded to 3 decimals), ordered by `order`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate_by(
    records: &[EnrichedRecord],
    dimension: Dimension,
    order: SortOrder,
) -> Vec<GroupCount> {
    let mut groups: BTreeMap<GroupKey, (u64, u64)> = BTreeMap::new();
    for record in records {
        let (count, severity_sum) = groups.entry(dimension.key_of(record)).or_insert((0, 0));
        *count += 1;
        *severity_sum += u64::from(record.severity().value());
    }

    let mut rows: Vec<GroupCount> = groups
        .into_iter()
        .map(|(key, (count, severity_sum))| GroupCount {
            key,
            count,
            mean_severity: round_to(severity_sum as f64 / count as f64, 3),
        })
        .collect();

    if order == SortOrder::CountDescending {
        // Stable sort keeps key order among equal counts.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
    }

    log::debug!("Aggregated {} group(s) by {dimension}", rows.len());
    rows
}
