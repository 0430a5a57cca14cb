//! Rate normalization against population and land-area reference tables.
//!
//! `rate = round(count / num_years / reference × 1000, 3)`
//!
//! Reference tables are expected to cover every group value that can occur
//! in cleaned data. A miss means the configuration and the data disagree,
//! so it fails the whole computation instead of skipping the group.

use std::collections::BTreeMap;

use us_accidents_analytics_models::GroupKey;

use crate::{AnalyticsError, round_to};

/// Accidents per year per 1000 residents for each group.
///
/// # Errors
///
/// Returns [`AnalyticsError::ReferenceLookup`] if a group has no population
/// entry, or [`AnalyticsError::ZeroYears`] if `num_years` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn per_capita_rate(
    counts: &BTreeMap<GroupKey, u64>,
    population: &BTreeMap<String, u64>,
    num_years: u32,
) -> Result<BTreeMap<GroupKey, f64>, AnalyticsError> {
    normalize(counts, num_years, "population", |key| {
        population.get(key).map(|&p| p as f64)
    })
}

/// Accidents per year per 1000 square miles for each group.
///
/// # Errors
///
/// Returns [`AnalyticsError::ReferenceLookup`] if a group has no area
/// entry, or [`AnalyticsError::ZeroYears`] if `num_years` is zero.
pub fn per_area_rate(
    counts: &BTreeMap<GroupKey, u64>,
    area: &BTreeMap<String, f64>,
    num_years: u32,
) -> Result<BTreeMap<GroupKey, f64>, AnalyticsError> {
    normalize(counts, num_years, "land area", |key| area.get(key).copied())
}

#[allow(clippy::cast_precision_loss)]
fn normalize(
    counts: &BTreeMap<GroupKey, u64>,
    num_years: u32,
    table: &'static str,
    lookup: impl Fn(&str) -> Option<f64>,
) -> Result<BTreeMap<GroupKey, f64>, AnalyticsError> {
    if num_years == 0 {
        return Err(AnalyticsError::ZeroYears);
    }

    counts
        .iter()
        .map(|(group, &count)| {
            let key = group.reference_id();
            let Some(reference) = lookup(&key) else {
                return Err(AnalyticsError::ReferenceLookup { table, key });
            };
            let per_year = count as f64 / f64::from(num_years);
            Ok((group.clone(), round_to(per_year / reference * 1000.0, 3)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use us_accidents_accident_models::Timezone;

    use super::*;

    fn state_counts(pairs: &[(&str, u64)]) -> BTreeMap<GroupKey, u64> {
        pairs
            .iter()
            .map(|(s, c)| (GroupKey::State((*s).to_string()), *c))
            .collect()
    }

    #[test]
    fn per_capita_annualizes_and_scales() {
        let counts = state_counts(&[("OH", 46_000)]);
        let population = BTreeMap::from([("OH".to_string(), 11_500_000u64)]);
        let rates = per_capita_rate(&counts, &population, 2).unwrap();
        // 46000 / 2 / 11.5M × 1000 = 2.0
        assert!((rates[&GroupKey::State("OH".to_string())] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn per_area_uses_square_miles() {
        let counts = state_counts(&[("RI", 3_000)]);
        let area = BTreeMap::from([("RI".to_string(), 1_033.81)]);
        let rates = per_area_rate(&counts, &area, 2).unwrap();
        // 1500 / 1033.81 × 1000 = 1450.9436…
        assert!((rates[&GroupKey::State("RI".to_string())] - 1_450.944).abs() < 1e-9);
    }

    #[test]
    fn timezone_groups_look_up_by_name() {
        let counts = BTreeMap::from([(GroupKey::Timezone(Timezone::Pacific), 530u64)]);
        let population = BTreeMap::from([("US/Pacific".to_string(), 53_000u64)]);
        let rates = per_capita_rate(&counts, &population, 1).unwrap();
        assert!((rates[&GroupKey::Timezone(Timezone::Pacific)] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn round_trips_to_counts() {
        let counts = state_counts(&[("CA", 120_345), ("TX", 77_777), ("VT", 321)]);
        let population = BTreeMap::from([
            ("CA".to_string(), 39_557_045u64),
            ("TX".to_string(), 28_701_845),
            ("VT".to_string(), 626_299),
        ]);
        let rates = per_capita_rate(&counts, &population, 2).unwrap();
        for (group, &count) in &counts {
            #[allow(clippy::cast_precision_loss)]
            let pop = population[&group.reference_id()] as f64;
            let recovered = rates[group] * pop * 2.0 / 1000.0;
            // Rounding to 3 decimals bounds the error by 0.0005 × pop × years / 1000.
            let tolerance = 0.0005 * pop * 2.0 / 1000.0;
            #[allow(clippy::cast_precision_loss)]
            let diff = (recovered - count as f64).abs();
            assert!(diff <= tolerance + 1e-6, "{group}: {recovered} vs {count}");
        }
    }

    #[test]
    fn missing_reference_is_fatal() {
        let counts = state_counts(&[("OH", 10), ("PR", 4)]);
        let population = BTreeMap::from([("OH".to_string(), 100u64), ("WY".to_string(), 5)]);
        match per_capita_rate(&counts, &population, 2) {
            Err(AnalyticsError::ReferenceLookup { table, key }) => {
                assert_eq!(table, "population");
                assert_eq!(key, "PR");
            }
            other => panic!("expected ReferenceLookup, got {other:?}"),
        }
    }

    #[test]
    fn reference_only_values_are_not_emitted() {
        let counts = state_counts(&[("OH", 10)]);
        let population = BTreeMap::from([("OH".to_string(), 100u64), ("WY".to_string(), 5)]);
        let rates = per_capita_rate(&counts, &population, 2).unwrap();
        assert_eq!(rates.len(), 1);
        assert!(!rates.contains_key(&GroupKey::State("WY".to_string())));
    }

    #[test]
    fn zero_years_is_rejected() {
        let counts = state_counts(&[("OH", 10)]);
        let area = BTreeMap::from([("OH".to_string(), 40_860.69)]);
        assert!(matches!(
            per_area_rate(&counts, &area, 0),
            Err(AnalyticsError::ZeroYears)
        ));
    }
}
