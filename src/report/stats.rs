//! Summary statistics over time-series readings
//!
//! Empty input is never an error: every aggregate falls back to zero and
//! unparseable timestamps are skipped one record at a time.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Reading;

/// One timestamped measurement as handed to the aggregator and renderers.
///
/// For insulin the value is the dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesReading {
    pub timestamp: String,
    pub value: Option<f64>,
}

impl TimeSeriesReading {
    pub fn new(timestamp: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

impl From<&Reading> for TimeSeriesReading {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.recorded_at.clone(),
            value: reading.value,
        }
    }
}

/// Average, minimum, maximum and count over a set of values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl AggregateStats {
    /// Copy with average, min and max rounded for display
    pub fn rounded(&self, precision: DisplayPrecision) -> Self {
        Self {
            average: precision.apply(self.average),
            min: precision.apply(self.min),
            max: precision.apply(self.max),
            count: self.count,
        }
    }
}

/// How many decimals an average is shown with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPrecision {
    /// Full precision
    Raw,
    Decimals(u8),
}

impl Default for DisplayPrecision {
    fn default() -> Self {
        DisplayPrecision::Decimals(1)
    }
}

impl DisplayPrecision {
    /// Parse `raw` or a decimal count between 0 and 6
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("raw") {
            return Some(DisplayPrecision::Raw);
        }
        match s.parse::<u8>() {
            Ok(n) if n <= 6 => Some(DisplayPrecision::Decimals(n)),
            _ => None,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self {
            DisplayPrecision::Raw => value,
            DisplayPrecision::Decimals(n) => {
                let factor = 10f64.powi(i32::from(*n));
                (value * factor).round() / factor
            }
        }
    }

    pub fn format(&self, value: f64) -> String {
        match self {
            DisplayPrecision::Raw => format!("{}", value),
            DisplayPrecision::Decimals(n) => format!("{:.*}", usize::from(*n), value),
        }
    }
}

/// Compute average/min/max/count. Empty input yields all zeros.
pub fn compute_stats(values: &[f64]) -> AggregateStats {
    if values.is_empty() {
        return AggregateStats::default();
    }

    let sum: f64 = values.iter().sum();
    AggregateStats {
        average: sum / values.len() as f64,
        min: values.iter().cloned().fold(f64::INFINITY, f64::min),
        max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        count: values.len(),
    }
}

/// Stats over the readings that carry a value
pub fn stats_for(readings: &[TimeSeriesReading]) -> AggregateStats {
    let values: Vec<f64> = readings.iter().filter_map(|r| r.value).collect();
    compute_stats(&values)
}

/// Parse a reading timestamp.
///
/// Accepts RFC 3339 (the written local time is kept, the offset ignored),
/// `YYYY-MM-DDTHH:MM[:SS[.f]]`, the same with a space separator, and bare
/// `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Count readings recorded on the same calendar day as `reference`
pub fn count_matching_day(records: &[TimeSeriesReading], reference: NaiveDate) -> usize {
    records
        .iter()
        .filter(|r| match parse_timestamp(&r.timestamp) {
            Some(dt) => dt.date() == reference,
            None => {
                tracing::debug!("Skipping reading with malformed timestamp {:?}", r.timestamp);
                false
            }
        })
        .count()
}

/// Average value per calendar day for the `days` days ending at `end`, oldest first.
///
/// Days without a valued reading map to `None`.
pub fn daily_averages(
    records: &[TimeSeriesReading],
    end: NaiveDate,
    days: usize,
) -> Vec<(NaiveDate, Option<f64>)> {
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for record in records {
        let (Some(dt), Some(value)) = (parse_timestamp(&record.timestamp), record.value) else {
            continue;
        };
        buckets.entry(dt.date()).or_default().push(value);
    }

    (0..days)
        .rev()
        .filter_map(|offset| end.checked_sub_days(chrono::Days::new(offset as u64)))
        .map(|day| {
            let avg = buckets
                .get(&day)
                .map(|values| compute_stats(values).average);
            (day, avg)
        })
        .collect()
}

/// Average value per calendar month for the `months` months ending with
/// `end`'s month, oldest first, keyed by the first day of the month
pub fn monthly_averages(
    records: &[TimeSeriesReading],
    end: NaiveDate,
    months: usize,
) -> Vec<(NaiveDate, Option<f64>)> {
    let mut buckets: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for record in records {
        let (Some(dt), Some(value)) = (parse_timestamp(&record.timestamp), record.value) else {
            continue;
        };
        buckets
            .entry((dt.year(), dt.month()))
            .or_default()
            .push(value);
    }

    let Some(first_of_end) = end.with_day(1) else {
        return Vec::new();
    };

    (0..months)
        .rev()
        .filter_map(|offset| first_of_end.checked_sub_months(Months::new(offset as u32)))
        .map(|month| {
            let avg = buckets
                .get(&(month.year(), month.month()))
                .map(|values| compute_stats(values).average);
            (month, avg)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(
            stats,
            AggregateStats {
                average: 0.0,
                min: 0.0,
                max: 0.0,
                count: 0
            }
        );
        assert!(!stats.average.is_nan());
    }

    #[test]
    fn test_basic_stats() {
        let stats = compute_stats(&[5.0, 10.0, 15.0]);
        assert_eq!(stats.average, 10.0);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 15.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_stats_are_order_independent() {
        let a = compute_stats(&[7.5, 3.0, 11.25, 4.0]);
        let b = compute_stats(&[11.25, 4.0, 7.5, 3.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stats_for_skips_missing_values() {
        let readings = vec![
            TimeSeriesReading::new("2026-10-19T08:00:00", Some(4.0)),
            TimeSeriesReading::new("2026-10-19T12:00:00", None),
            TimeSeriesReading::new("2026-10-19T18:00:00", Some(8.0)),
        ];
        let stats = stats_for(&readings);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average, 6.0);
    }

    #[test]
    fn test_display_precision() {
        let stats = compute_stats(&[6.0, 6.1, 6.25]);
        let rounded = stats.rounded(DisplayPrecision::Decimals(1));
        assert_eq!(rounded.average, 6.1);
        assert_eq!(rounded.max, 6.3);
        assert_eq!(stats.rounded(DisplayPrecision::Raw), stats);

        assert_eq!(DisplayPrecision::Decimals(2).format(6.0), "6.00");
        assert_eq!(DisplayPrecision::parse("raw"), Some(DisplayPrecision::Raw));
        assert_eq!(DisplayPrecision::parse("3"), Some(DisplayPrecision::Decimals(3)));
        assert_eq!(DisplayPrecision::parse("12"), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = day("2026-10-19").and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-10-19T08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-19 08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-19T08:30"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-19T08:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-19T08:30:00.250Z").map(|d| d.date()), Some(day("2026-10-19")));
        assert_eq!(
            parse_timestamp("2026-10-19"),
            day("2026-10-19").and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("19/10/2026"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_count_matching_day() {
        let today = day("2026-10-19");
        let readings = vec![
            TimeSeriesReading::new("2026-10-19T08:00:00", Some(5.0)),
            TimeSeriesReading::new("2026-10-18T23:59:59", Some(6.0)),
        ];
        assert_eq!(count_matching_day(&readings, today), 1);
    }

    #[test]
    fn test_count_matching_day_skips_malformed() {
        let today = day("2026-10-19");
        let readings = vec![
            TimeSeriesReading::new("not a date", Some(5.0)),
            TimeSeriesReading::new("2026-10-19T00:00:00", Some(6.0)),
            TimeSeriesReading::new("2026-13-40T00:00:00", Some(6.0)),
            TimeSeriesReading::new("2026-10-19T23:00:00-05:00", None),
        ];
        assert_eq!(count_matching_day(&readings, today), 2);
        assert_eq!(count_matching_day(&[], today), 0);
    }

    #[test]
    fn test_daily_averages() {
        let readings = vec![
            TimeSeriesReading::new("2026-10-19T08:00:00", Some(10.0)),
            TimeSeriesReading::new("2026-10-19T20:00:00", Some(12.0)),
            TimeSeriesReading::new("2026-10-17T08:00:00", Some(7.0)),
            TimeSeriesReading::new("2026-10-10T08:00:00", Some(30.0)),
            TimeSeriesReading::new("garbage", Some(99.0)),
        ];
        let series = daily_averages(&readings, day("2026-10-19"), 3);
        assert_eq!(
            series,
            vec![
                (day("2026-10-17"), Some(7.0)),
                (day("2026-10-18"), None),
                (day("2026-10-19"), Some(11.0)),
            ]
        );
    }

    #[test]
    fn test_monthly_averages() {
        let readings = vec![
            TimeSeriesReading::new("2026-10-02T08:00:00", Some(8.0)),
            TimeSeriesReading::new("2026-10-19T08:00:00", Some(10.0)),
            TimeSeriesReading::new("2026-08-15T08:00:00", Some(6.0)),
            TimeSeriesReading::new("2025-12-15T08:00:00", Some(20.0)),
        ];
        let series = monthly_averages(&readings, day("2026-10-19"), 3);
        assert_eq!(
            series,
            vec![
                (day("2026-08-01"), Some(6.0)),
                (day("2026-09-01"), None),
                (day("2026-10-01"), Some(9.0)),
            ]
        );
    }
}
