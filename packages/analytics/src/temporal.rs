//! Time-series breakdowns: month-by-month counts per year, and hour-of-day
//! counts per year-month.

use std::collections::BTreeMap;

use us_accidents_accident_models::{EnrichedRecord, YearMonth};
use us_accidents_analytics_models::{HourlySeries, MonthCount};

/// Hours in a day; the length of every [`HourlySeries::counts`].
pub const HOURS_PER_DAY: usize = 24;

/// Counts records per month within each year.
///
/// Months without records are omitted from a year's series.
#[must_use]
pub fn monthly_counts_by_year(records: &[EnrichedRecord]) -> BTreeMap<i32, Vec<MonthCount>> {
    let mut counts: BTreeMap<i32, BTreeMap<u32, u64>> = BTreeMap::new();
    for record in records {
        *counts
            .entry(record.year)
            .or_default()
            .entry(record.month)
            .or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(year, months)| {
            let series = months
                .into_iter()
                .map(|(month, count)| MonthCount { month, count })
                .collect();
            (year, series)
        })
        .collect()
}

/// Counts records per hour of the day within each year-month.
///
/// Every series has exactly 24 entries; hours without records are zero.
#[must_use]
pub fn hourly_counts_by_year_month(records: &[EnrichedRecord]) -> Vec<HourlySeries> {
    let mut counts: BTreeMap<YearMonth, Vec<u64>> = BTreeMap::new();
    for record in records {
        let hours = counts
            .entry(record.year_month)
            .or_insert_with(|| vec![0; HOURS_PER_DAY]);
        if let Some(slot) = usize::try_from(record.hour)
            .ok()
            .and_then(|h| hours.get_mut(h))
        {
            *slot += 1;
        }
    }

    counts
        .into_iter()
        .map(|(year_month, counts)| HourlySeries { year_month, counts })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::test_support::sample;

    use super::*;

    #[test]
    fn months_are_grouped_per_year() {
        let by_year = monthly_counts_by_year(&sample());
        assert_eq!(by_year.keys().copied().collect::<Vec<_>>(), vec![2017, 2018]);

        let y2017 = &by_year[&2017];
        assert_eq!(
            y2017,
            &vec![
                MonthCount { month: 1, count: 2 },
                MonthCount { month: 2, count: 1 },
                MonthCount { month: 7, count: 1 },
            ]
        );
        let total: u64 = by_year.values().flatten().map(|m| m.count).sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn hourly_series_are_zero_filled() {
        let series = hourly_counts_by_year_month(&sample());
        assert!(series.iter().all(|s| s.counts.len() == HOURS_PER_DAY));
        assert!(series.windows(2).all(|w| w[0].year_month < w[1].year_month));

        let jan = &series[0];
        assert_eq!(jan.year_month, YearMonth { year: 2017, month: 1 });
        assert_eq!(jan.counts[8], 2);
        assert_eq!(jan.counts.iter().sum::<u64>(), 2);

        let dec = series.last().unwrap();
        assert_eq!(dec.year_month, YearMonth { year: 2018, month: 12 });
        assert_eq!(dec.counts[23], 1);
    }
}
