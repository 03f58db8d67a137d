//! Report inputs assembled from the database
//!
//! Both renderers take plain value objects; this module is the only place in
//! `report` that touches SQLite.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::charts::ChartPoint;
use super::observations::ObservationInput;
use super::pdf::PdfReportInput;
use super::stats::{daily_averages, monthly_averages, stats_for, AggregateStats, TimeSeriesReading};
use super::{ReportError, ReportResult};
use crate::models::{DiabetesType, Metric, PatientProfile, Reading};

/// mg/dL per mmol/L of blood glucose
pub const MGDL_PER_MMOLL: f64 = 18.0;

/// Days shown on the weekly glucose chart
pub const WEEKLY_DAYS: usize = 7;
/// Months shown on the monthly glucose trend
pub const TREND_MONTHS: usize = 6;

/// Everything the HTML report shows about one patient
#[derive(Debug, Clone, Serialize)]
pub struct PatientReportContext {
    pub first_name: String,
    pub last_name: String,
    pub diabetes_type: DiabetesType,
    pub bmi: Option<f64>,
    pub glucose: AggregateStats,
    pub weight: AggregateStats,
    pub insulin: AggregateStats,
    pub systolic: AggregateStats,
    pub diastolic: AggregateStats,
    /// Most recent first, as supplied
    pub recent_glucose: Vec<TimeSeriesReading>,
    pub recent_weight: Vec<TimeSeriesReading>,
    pub recent_insulin: Vec<TimeSeriesReading>,
}

impl PatientReportContext {
    /// Load the profile and readings. Stats cover every reading; the recent
    /// lists keep at most `history_limit` entries per metric.
    pub fn from_database(conn: &Connection, history_limit: usize) -> ReportResult<Self> {
        let profile = PatientProfile::get(conn)?.ok_or(ReportError::MissingProfile)?;

        let glucose = load_series(conn, Metric::Glucose)?;
        let weight = load_series(conn, Metric::Weight)?;
        let insulin = load_series(conn, Metric::Insulin)?;

        let (systolic, diastolic) = blood_pressure_stats(conn)?;
        let bmi = latest_bmi(conn, &profile)?;

        Ok(Self {
            first_name: profile.first_name,
            last_name: profile.last_name,
            diabetes_type: profile.diabetes_type,
            bmi,
            glucose: stats_for(&glucose),
            weight: stats_for(&weight),
            insulin: stats_for(&insulin),
            systolic,
            diastolic,
            recent_glucose: truncated(glucose, history_limit),
            recent_weight: truncated(weight, history_limit),
            recent_insulin: truncated(insulin, history_limit),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn observation_input(&self) -> ObservationInput {
        ObservationInput {
            glucose: self.glucose,
            bmi: self.bmi,
            insulin_count: self.insulin.count,
        }
    }
}

impl PdfReportInput {
    /// Build the PDF bundle with glucose series ending at `today`
    pub fn from_database(conn: &Connection, today: NaiveDate) -> ReportResult<Self> {
        let profile = PatientProfile::get(conn)?.ok_or(ReportError::MissingProfile)?;
        let glucose = load_series(conn, Metric::Glucose)?;
        let bmi = latest_bmi(conn, &profile)?;

        let weekly_glucose = daily_averages(&glucose, today, WEEKLY_DAYS)
            .into_iter()
            .filter_map(|(day, avg)| {
                avg.map(|v| ChartPoint::new(day.format("%a").to_string(), to_mg_dl(v)))
            })
            .collect();

        let monthly_glucose = monthly_averages(&glucose, today, TREND_MONTHS)
            .into_iter()
            .filter_map(|(month, avg)| {
                avg.map(|v| ChartPoint::new(month.format("%b").to_string(), to_mg_dl(v)))
            })
            .collect();

        Ok(Self {
            patient_name: profile.full_name(),
            patient_id: profile.patient_id,
            status: profile.status,
            diabetes_type: profile.diabetes_type,
            diagnosis_date: profile.diagnosis_date,
            activity_level: profile.activity_level,
            bmi,
            a1c: profile.a1c,
            compliance: profile.compliance,
            meals_per_day: profile.meals_per_day.max(0) as u32,
            insulin_injections: profile.insulin_injections.max(0) as u32,
            weekly_glucose,
            monthly_glucose,
        })
    }
}

fn load_series(conn: &Connection, metric: Metric) -> ReportResult<Vec<TimeSeriesReading>> {
    let readings = Reading::list_by_metric(conn, metric, None)?;
    Ok(readings.iter().map(TimeSeriesReading::from).collect())
}

/// Systolic and diastolic aggregates over every blood pressure reading
fn blood_pressure_stats(conn: &Connection) -> ReportResult<(AggregateStats, AggregateStats)> {
    let readings = Reading::list_by_metric(conn, Metric::BloodPressure, None)?;
    let systolic: Vec<TimeSeriesReading> = readings.iter().map(TimeSeriesReading::from).collect();
    let diastolic: Vec<TimeSeriesReading> = readings
        .iter()
        .map(|r| TimeSeriesReading::new(r.recorded_at.clone(), r.value2))
        .collect();
    Ok((stats_for(&systolic), stats_for(&diastolic)))
}

fn latest_bmi(conn: &Connection, profile: &PatientProfile) -> ReportResult<Option<f64>> {
    let latest_weight = Reading::latest_with_value(conn, Metric::Weight)?;
    Ok(latest_weight
        .and_then(|r| r.value)
        .and_then(|kg| profile.bmi(kg)))
}

fn truncated(mut readings: Vec<TimeSeriesReading>, limit: usize) -> Vec<TimeSeriesReading> {
    readings.truncate(limit);
    readings
}

fn to_mg_dl(mmol_l: f64) -> f64 {
    (mmol_l * MGDL_PER_MMOLL).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{
        migrated_connection, record, sample_profile, seeded_connection,
    };
    use crate::models::ReadingCreate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_context_from_database() {
        let conn = seeded_connection();
        let ctx = PatientReportContext::from_database(&conn, 7).unwrap();

        assert_eq!(ctx.full_name(), "John Doe");
        assert_eq!(ctx.glucose.count, 5);
        assert!((ctx.glucose.average - 11.0).abs() < 1e-9);
        assert_eq!(ctx.glucose.min, 9.5);
        assert_eq!(ctx.glucose.max, 12.5);
        assert_eq!(ctx.insulin.count, 2);
        assert_eq!(ctx.weight.count, 2);

        // most recent first
        assert_eq!(ctx.recent_glucose[0].timestamp, "2026-10-19T19:30:00");
        assert_eq!(ctx.recent_weight[0].value, Some(97.2));

        let bmi = ctx.bmi.unwrap();
        assert!((bmi - 97.2 / (1.8 * 1.8)).abs() < 1e-9);
    }

    #[test]
    fn test_blood_pressure_aggregates() {
        let conn = seeded_connection();
        for (at, sys, dia) in [
            ("2026-10-18T08:00:00", 130.0, 85.0),
            ("2026-10-19T08:00:00", 120.0, 75.0),
        ] {
            Reading::create(
                &conn,
                &ReadingCreate {
                    metric: Metric::BloodPressure,
                    recorded_at: Some(at.to_string()),
                    value: Some(sys),
                    value2: Some(dia),
                    notes: None,
                },
            )
            .unwrap();
        }
        record(&conn, Metric::BloodPressure, "2026-10-19T20:00:00", None);

        let ctx = PatientReportContext::from_database(&conn, 7).unwrap();
        assert_eq!(ctx.systolic.count, 2);
        assert_eq!(ctx.systolic.average, 125.0);
        assert_eq!(ctx.systolic.max, 130.0);
        assert_eq!(ctx.diastolic.count, 2);
        assert_eq!(ctx.diastolic.min, 75.0);
        assert_eq!(ctx.diastolic.average, 80.0);
    }

    #[test]
    fn test_mixed_timestamp_formats_order_by_time() {
        let conn = migrated_connection();
        PatientProfile::set(&conn, &sample_profile()).unwrap();
        record(&conn, Metric::Glucose, "2026-10-19T08:00:00", Some(6.0));
        record(&conn, Metric::Glucose, "2026-10-19 23:00:00", Some(9.0));
        record(&conn, Metric::Weight, "2026-10-19T06:00:00", Some(100.0));
        record(&conn, Metric::Weight, "2026-10-19 22:00:00", Some(70.0));

        let ctx = PatientReportContext::from_database(&conn, 7).unwrap();
        assert_eq!(ctx.recent_glucose[0].timestamp, "2026-10-19T23:00:00");
        assert_eq!(ctx.recent_weight[0].value, Some(70.0));

        let bmi = ctx.bmi.unwrap();
        assert!((bmi - 70.0 / (1.8 * 1.8)).abs() < 1e-9);
        let observations = crate::report::generate_observations(&ctx.observation_input());
        assert!(!observations.iter().any(|o| o.contains("BMI")));
    }

    #[test]
    fn test_history_limit_keeps_newest() {
        let conn = seeded_connection();
        let ctx = PatientReportContext::from_database(&conn, 2).unwrap();
        assert_eq!(ctx.recent_glucose.len(), 2);
        assert_eq!(ctx.recent_glucose[1].timestamp, "2026-10-19T07:30:00");
        // stats still cover everything
        assert_eq!(ctx.glucose.count, 5);
    }

    #[test]
    fn test_missing_profile() {
        let conn = migrated_connection();
        record(&conn, Metric::Glucose, "2026-10-19T08:00:00", Some(6.0));
        let err = PatientReportContext::from_database(&conn, 7).unwrap_err();
        assert!(matches!(err, ReportError::MissingProfile));
        assert!(matches!(
            PdfReportInput::from_database(&conn, today()),
            Err(ReportError::MissingProfile)
        ));
    }

    #[test]
    fn test_pdf_input_series() {
        let conn = seeded_connection();
        let input = PdfReportInput::from_database(&conn, today()).unwrap();

        assert_eq!(input.patient_name, "John Doe");
        assert_eq!(input.insulin_injections, 3);

        // readings on Oct 13, 15, 17 and two on Oct 19 (a Monday)
        let labels: Vec<&str> = input.weekly_glucose.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Tue", "Thu", "Sat", "Mon"]);
        assert_eq!(input.weekly_glucose[0].value, 171.0);
        assert_eq!(input.weekly_glucose[3].value, 198.0);

        assert_eq!(input.monthly_glucose.len(), 1);
        assert_eq!(input.monthly_glucose[0].label, "Oct");
        assert_eq!(input.monthly_glucose[0].value, 198.0);
    }
}
