//! Reading tools
//!
//! Glucose, weight, insulin and blood pressure measurements.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::models::{Metric, Reading, ReadingCreate};
use crate::report::stats::{count_matching_day, parse_timestamp};
use crate::report::TimeSeriesReading;

const VALID_METRICS: &str = "glucose, weight, insulin, blood_pressure (bp)";

/// Response for add_reading
#[derive(Debug, Serialize)]
pub struct AddReadingResponse {
    pub id: i64,
    pub metric: String,
    pub value: String,
    pub recorded_at: String,
    pub created_at: String,
}

/// Reading summary for listing
#[derive(Debug, Serialize)]
pub struct ReadingSummary {
    pub id: i64,
    pub metric: String,
    pub metric_display: String,
    pub value: Option<f64>,
    pub value2: Option<f64>,
    pub value_formatted: String,
    pub recorded_at: String,
    pub notes: Option<String>,
}

impl From<&Reading> for ReadingSummary {
    fn from(reading: &Reading) -> Self {
        Self {
            id: reading.id,
            metric: reading.metric.as_str().to_string(),
            metric_display: reading.metric.display_name().to_string(),
            value: reading.value,
            value2: reading.value2,
            value_formatted: reading.format_value(),
            recorded_at: reading.recorded_at.clone(),
            notes: reading.notes.clone(),
        }
    }
}

/// Response for list_readings
#[derive(Debug, Serialize)]
pub struct ListReadingsResponse {
    pub readings: Vec<ReadingSummary>,
    /// Number of readings returned
    pub returned: usize,
    /// Number of readings stored for the metric
    pub total: i64,
}

/// Response for delete_reading
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for count_readings_today
#[derive(Debug, Serialize)]
pub struct CountReadingsResponse {
    pub metric: String,
    pub date: String,
    pub count: usize,
}

fn parse_metric(metric: &str) -> Result<Metric, String> {
    Metric::from_str(metric)
        .ok_or_else(|| format!("Invalid metric: '{}'. Valid metrics: {}", metric, VALID_METRICS))
}

/// Record a new measurement
pub fn add_reading(
    db: &Database,
    metric: &str,
    value: Option<f64>,
    value2: Option<f64>,
    recorded_at: Option<&str>,
    notes: Option<&str>,
) -> Result<AddReadingResponse, String> {
    let metric = parse_metric(metric)?;

    if metric == Metric::BloodPressure && value.is_some() && value2.is_none() {
        return Err(
            "Blood pressure requires both systolic (value) and diastolic (value2) values"
                .to_string(),
        );
    }
    if let Some(ts) = recorded_at {
        if parse_timestamp(ts).is_none() {
            return Err(format!(
                "Invalid timestamp: '{}'. Use YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD",
                ts
            ));
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = ReadingCreate {
        metric,
        recorded_at: recorded_at.map(String::from),
        value,
        value2,
        notes: notes.map(String::from),
    };

    let reading =
        Reading::create(&conn, &data).map_err(|e| format!("Failed to add reading: {}", e))?;

    Ok(AddReadingResponse {
        id: reading.id,
        metric: reading.metric.as_str().to_string(),
        value: reading.format_value(),
        recorded_at: reading.recorded_at,
        created_at: reading.created_at,
    })
}

/// List readings of one metric, most recent first
pub fn list_readings(
    db: &Database,
    metric: &str,
    limit: Option<i64>,
) -> Result<ListReadingsResponse, String> {
    let metric = parse_metric(metric)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let readings = Reading::list_by_metric(&conn, metric, limit)
        .map_err(|e| format!("Failed to list readings: {}", e))?;

    let total = Reading::count_by_metric(&conn, metric)
        .map_err(|e| format!("Failed to count readings: {}", e))?;

    let summaries: Vec<ReadingSummary> = readings.iter().map(ReadingSummary::from).collect();
    let returned = summaries.len();

    Ok(ListReadingsResponse {
        readings: summaries,
        returned,
        total,
    })
}

/// Delete a reading
pub fn delete_reading(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted =
        Reading::delete(&conn, id).map_err(|e| format!("Failed to delete reading: {}", e))?;
    if !deleted {
        return Err(format!("Reading not found with id: {}", id));
    }

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Count readings of a metric taken on `date` (default today)
pub fn count_readings_today(
    db: &Database,
    metric: &str,
    date: Option<&str>,
) -> Result<CountReadingsResponse, String> {
    let metric = parse_metric(metric)?;
    let day = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date: '{}'. Use YYYY-MM-DD", d))?,
        None => Local::now().date_naive(),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let readings = Reading::list_by_metric(&conn, metric, None)
        .map_err(|e| format!("Failed to list readings: {}", e))?;

    let records: Vec<TimeSeriesReading> = readings.iter().map(TimeSeriesReading::from).collect();

    Ok(CountReadingsResponse {
        metric: metric.as_str().to_string(),
        date: day.format("%Y-%m-%d").to_string(),
        count: count_matching_day(&records, day),
    })
}
