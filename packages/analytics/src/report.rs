//! Assembles per-dimension metric tables and the full accident report.

use std::collections::BTreeMap;

use us_accidents_accident_models::EnrichedRecord;
use us_accidents_analytics_models::{
    AccidentReport, Dimension, GroupKey, GroupMetric, MetricTable,
};
use us_accidents_config::AnalysisConfig;

use crate::aggregate::{aggregate_by, counts_by};
use crate::rates::{per_area_rate, per_capita_rate};
use crate::severity::{severity_counts_by, severity_distribution, weighted_index};
use crate::temporal::{hourly_counts_by_year_month, monthly_counts_by_year};
use crate::AnalyticsError;

/// Builds the metric table for one dimension.
///
/// Timezone rows carry a per-capita rate; state rows carry per-capita and
/// per-area rates. Other dimensions have no reference data, so their rate
/// columns stay empty.
///
/// # Errors
///
/// Returns [`AnalyticsError::ReferenceLookup`] if a timezone or state in the
/// data is missing from the configured reference tables, or
/// [`AnalyticsError::ZeroYears`] if the configuration spans zero years.
pub fn build_table(
    records: &[EnrichedRecord],
    dimension: Dimension,
    config: &AnalysisConfig,
) -> Result<MetricTable, AnalyticsError> {
    let groups = aggregate_by(records, dimension, dimension.report_order());

    let mut indices: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for (group, counts) in severity_counts_by(records, dimension) {
        match weighted_index(&group, &counts) {
            Ok(index) => {
                indices.insert(group, index);
            }
            Err(e) => log::warn!("Skipping weighted severity index: {e}"),
        }
    }

    let (per_capita, per_area) = match dimension {
        Dimension::Timezone => {
            let counts = counts_by(records, dimension);
            let pop = per_capita_rate(&counts, &config.population_by_timezone, config.num_years)?;
            (pop, BTreeMap::new())
        }
        Dimension::State => {
            let counts = counts_by(records, dimension);
            let pop = per_capita_rate(&counts, &config.population_by_state, config.num_years)?;
            let area = per_area_rate(&counts, &config.area_by_state, config.num_years)?;
            (pop, area)
        }
        Dimension::Weather
        | Dimension::Hour
        | Dimension::Weekday
        | Dimension::Month
        | Dimension::YearMonth => (BTreeMap::new(), BTreeMap::new()),
    };

    let rows = groups
        .into_iter()
        .map(|group| GroupMetric {
            weighted_severity_index: indices.get(&group.key).copied(),
            rate_per_year_per_1000_pop: per_capita.get(&group.key).copied(),
            rate_per_year_per_1000_area: per_area.get(&group.key).copied(),
            count: group.count,
            mean_severity: group.mean_severity,
            group_key: group.key,
        })
        .collect();

    Ok(MetricTable { dimension, rows })
}

/// Builds every dimension's table plus the severity and time-series
/// breakdowns.
///
/// # Errors
///
/// Propagates the first error from [`build_table`].
pub fn build_report(
    records: &[EnrichedRecord],
    config: &AnalysisConfig,
) -> Result<AccidentReport, AnalyticsError> {
    let tables = Dimension::all()
        .iter()
        .map(|&dimension| build_table(records, dimension, config))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Built {} table(s) from {} record(s)",
        tables.len(),
        records.len()
    );

    Ok(AccidentReport {
        total_records: records.len() as u64,
        tables,
        severity_by_timezone: severity_distribution(records, Dimension::Timezone),
        monthly_by_year: monthly_counts_by_year(records),
        hourly_by_year_month: hourly_counts_by_year_month(records),
    })
}

#[cfg(test)]
mod tests {
    use us_accidents_accident_models::Timezone;

    use crate::test_support::{accident, sample};

    use super::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::embedded().unwrap()
    }

    #[test]
    fn state_table_carries_both_rates() {
        let table = build_table(&sample(), Dimension::State, &config()).unwrap();
        let keys: Vec<String> = table.rows.iter().map(|r| r.group_key.to_string()).collect();
        assert_eq!(keys, vec!["OH", "CA", "TX"]);

        for row in &table.rows {
            assert!(row.weighted_severity_index.is_some());
            assert!(row.rate_per_year_per_1000_pop.is_some());
            assert!(row.rate_per_year_per_1000_area.is_some());
        }
        assert!((table.rows[0].weighted_severity_index.unwrap() - 64.52).abs() < 1e-9);
    }

    #[test]
    fn timezone_table_has_population_rate_only() {
        let table = build_table(&sample(), Dimension::Timezone, &config()).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.rate_per_year_per_1000_pop.is_some()));
        assert!(table.rows.iter().all(|r| r.rate_per_year_per_1000_area.is_none()));
    }

    #[test]
    fn temporal_tables_have_no_rates() {
        let table = build_table(&sample(), Dimension::Hour, &config()).unwrap();
        assert!(table.rows.iter().all(|r| {
            r.rate_per_year_per_1000_pop.is_none() && r.rate_per_year_per_1000_area.is_none()
        }));
        assert!(table.rows.windows(2).all(|w| w[0].group_key < w[1].group_key));
    }

    #[test]
    fn embedded_config_covers_every_timezone() {
        let records: Vec<_> = Timezone::all()
            .iter()
            .map(|&tz| accident("OH", tz, 1, "Clear", (2018, 6, 1, 12)))
            .collect();
        let table = build_table(&records, Dimension::Timezone, &config()).unwrap();
        assert_eq!(table.rows.len(), Timezone::all().len());
    }

    #[test]
    fn unknown_state_fails_the_report() {
        let mut records = sample();
        records.push(accident("PR", Timezone::Eastern, 1, "Clear", (2018, 3, 3, 3)));
        match build_report(&records, &config()) {
            Err(AnalyticsError::ReferenceLookup { key, .. }) => assert_eq!(key, "PR"),
            other => panic!("expected ReferenceLookup, got {other:?}"),
        }
    }

    #[test]
    fn report_covers_every_dimension() {
        let report = build_report(&sample(), &config()).unwrap();
        assert_eq!(report.total_records, 7);
        assert_eq!(report.tables.len(), Dimension::all().len());
        for table in &report.tables {
            assert_eq!(table.total_count(), 7, "{}", table.dimension);
        }
        assert!(report.table(Dimension::Weekday).is_some());
        assert_eq!(report.severity_by_timezone.len(), 3);
        assert_eq!(report.monthly_by_year.len(), 2);
        assert_eq!(report.hourly_by_year_month.len(), 6);
    }

    #[test]
    fn empty_input_builds_empty_tables() {
        let report = build_report(&[], &config()).unwrap();
        assert_eq!(report.total_records, 0);
        assert!(report.tables.iter().all(|t| t.rows.is_empty()));
        assert!(report.hourly_by_year_month.is_empty());
    }

    #[test]
    fn cleaned_rows_partition_every_table() {
        use us_accidents_ingest::progress::null_progress;
        use us_accidents_ingest::{CleanedRecords, clean, enrich, loader};

        let csv = "\
ID,Severity,Start_Time,Start_Lat,Start_Lng,State,Timezone,Weather_Condition,Sunrise_Sunset,Street
A-1,2,2017-06-15 10:00:00,39.8,-84.0,OH,US/Eastern,Clear,Day,Main St
A-2,4,2018-12-31 23:59:59,34.0,-118.2,CA,US/Pacific,Rain,Night,
A-3,1,2019-01-01 00:00:00,39.8,-84.0,OH,US/Eastern,Clear,Day,
A-4,3,2017-03-01 08:00:00,30.2,-97.7,TX,US/Central,Fog,Day,
A-5,0,2018-07-04 17:45:00,39.7,-105.0,CO,US/Mountain,Clear,Day,
A-6,2,2018-07-04 18:10:00.000,40.0,-105.2,CO,US/Mountain,Snow,Night,
A-7,,2018-07-05 09:00:00,40.0,-105.2,CO,US/Mountain,Snow,Day,
A-8,2,2017-11-20 07:30:00,,-83.0,OH,US/Eastern,Overcast,Day,
";
        let config = config();
        let table = loader::load_reader(csv.as_bytes(), b',', &null_progress()).unwrap();
        let CleanedRecords { records, report } = clean::clean(table, &config.date_window);
        let records = enrich::enrich(records);
        assert_eq!(report.rows_after, 5);

        let built = build_report(&records, &config).unwrap();
        assert_eq!(built.total_records, report.rows_after as u64);
        for table in &built.tables {
            assert_eq!(
                table.total_count(),
                report.rows_after as u64,
                "{} does not partition the cleaned rows",
                table.dimension
            );
        }
        let hourly: u64 = built
            .hourly_by_year_month
            .iter()
            .flat_map(|s| s.counts.iter())
            .sum();
        assert_eq!(hourly, report.rows_after as u64);
    }
}

