//! Temporal enrichment stage.
//!
//! Derives year, month, hour, year-month period, and weekday from each
//! record's start time. Timestamps are taken as-is; no timezone conversion
//! happens here.

use us_accidents_accident_models::{EnrichedRecord, Record};

/// Adds calendar fields to every record.
#[must_use]
pub fn enrich(records: Vec<Record>) -> Vec<EnrichedRecord> {
    let enriched: Vec<EnrichedRecord> = records
        .into_iter()
        .map(EnrichedRecord::from_record)
        .collect();
    log::info!(
        "Added required date columns to {} record(s)",
        enriched.len()
    );
    enriched
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use us_accidents_accident_models::{DayOfWeek, DayPhase, Severity, Timezone, YearMonth};

    use super::*;

    fn record(id: &str, y: i32, m: u32, d: u32, h: u32) -> Record {
        Record {
            id: id.to_string(),
            state: "CA".to_string(),
            timezone: Timezone::Pacific,
            start_time: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 15, 0)
                .unwrap(),
            severity: Severity::Minor,
            weather_condition: "Overcast".to_string(),
            start_lat: 37.76,
            start_lng: -122.44,
            sunrise_sunset: DayPhase::Day,
        }
    }

    #[test]
    fn derives_fields_for_each_record() {
        let enriched = enrich(vec![
            record("A-1", 2017, 12, 31, 23),
            record("A-2", 2018, 1, 1, 0),
        ]);

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].year_month, YearMonth { year: 2017, month: 12 });
        assert_eq!(enriched[0].weekday, DayOfWeek::Sunday);
        assert_eq!(enriched[0].hour, 23);
        assert_eq!(enriched[1].year, 2018);
        assert_eq!(enriched[1].month, 1);
        assert_eq!(enriched[1].hour, 0);
        assert_eq!(enriched[1].weekday, DayOfWeek::Monday);
        assert!(enriched[0].year_month < enriched[1].year_month);
    }

    #[test]
    fn preserves_record_order_and_content() {
        let input = vec![record("A-9", 2018, 5, 4, 7), record("A-3", 2017, 2, 1, 8)];
        let enriched = enrich(input.clone());
        let ids: Vec<&str> = enriched.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, vec!["A-9", "A-3"]);
        assert_eq!(enriched[1].record, input[1]);
    }
}
