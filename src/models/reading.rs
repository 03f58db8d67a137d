//! Reading model
//!
//! Time-stamped health measurements: blood glucose, weight, insulin doses and
//! blood pressure. Readings are immutable once recorded; they can only be
//! added or deleted.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::report::stats::parse_timestamp;

/// Storage format of `recorded_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Kind of measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Glucose,
    Weight,
    Insulin,
    BloodPressure,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Glucose => "glucose",
            Metric::Weight => "weight",
            Metric::Insulin => "insulin",
            Metric::BloodPressure => "blood_pressure",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "glucose" | "blood_sugar" | "sugar" => Some(Metric::Glucose),
            "weight" => Some(Metric::Weight),
            "insulin" | "dose" => Some(Metric::Insulin),
            "blood_pressure" | "bp" => Some(Metric::BloodPressure),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Glucose => "Blood Glucose",
            Metric::Weight => "Weight",
            Metric::Insulin => "Insulin",
            Metric::BloodPressure => "Blood Pressure",
        }
    }

    /// Unit readings of this metric are stored in
    pub fn default_unit(&self) -> &'static str {
        match self {
            Metric::Glucose => "mmol/L",
            Metric::Weight => "kg",
            Metric::Insulin => "units",
            Metric::BloodPressure => "mmHg",
        }
    }

    /// Whether this metric uses value2 (diastolic for blood pressure)
    pub fn uses_value2(&self) -> bool {
        matches!(self, Metric::BloodPressure)
    }
}

/// A recorded measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub metric: Metric,
    pub recorded_at: String,
    pub value: Option<f64>,
    pub value2: Option<f64>,
    pub unit: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for recording a new measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingCreate {
    pub metric: Metric,
    pub recorded_at: Option<String>,
    pub value: Option<f64>,
    pub value2: Option<f64>,
    pub notes: Option<String>,
}

impl Reading {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let metric_str: String = row.get("metric")?;
        let metric = Metric::from_str(&metric_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown metric {:?}", metric_str).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            metric,
            recorded_at: row.get("recorded_at")?,
            value: row.get("value")?,
            value2: row.get("value2")?,
            unit: row.get("unit")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Record a new measurement
    pub fn create(conn: &Connection, data: &ReadingCreate) -> DbResult<Self> {
        if let Some(v) = data.value {
            if !v.is_finite() || v < 0.0 {
                return Err(DbError::InvalidValue {
                    field: "value",
                    value: v.to_string(),
                });
            }
        }

        // one canonical form so ORDER BY recorded_at is chronological
        let recorded_at = match data.recorded_at.as_deref() {
            Some(raw) => parse_timestamp(raw)
                .ok_or_else(|| DbError::InvalidValue {
                    field: "recorded_at",
                    value: raw.to_string(),
                })?
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            None => chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        let value2 = if data.metric.uses_value2() { data.value2 } else { None };

        conn.execute(
            r#"
            INSERT INTO readings (metric, recorded_at, value, value2, unit, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.metric.as_str(),
                recorded_at,
                data.value,
                value2,
                data.metric.default_unit(),
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let reading = conn
            .query_row("SELECT * FROM readings WHERE id = ?1", [id], Self::from_row)
            .optional()?;
        Ok(reading)
    }

    /// List readings of one metric, most recent first
    pub fn list_by_metric(
        conn: &Connection,
        metric: Metric,
        limit: Option<i64>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM readings WHERE metric = ?1
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?2",
        )?;
        // SQLite treats a negative LIMIT as "no limit"
        let readings = stmt
            .query_map(params![metric.as_str(), limit.unwrap_or(-1)], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    /// Most recent reading of a metric that carries a value
    pub fn latest_with_value(conn: &Connection, metric: Metric) -> DbResult<Option<Self>> {
        let reading = conn
            .query_row(
                "SELECT * FROM readings WHERE metric = ?1 AND value IS NOT NULL
                 ORDER BY recorded_at DESC, id DESC LIMIT 1",
                [metric.as_str()],
                Self::from_row,
            )
            .optional()?;
        Ok(reading)
    }

    pub fn count_by_metric(conn: &Connection, metric: Metric) -> DbResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM readings WHERE metric = ?1",
            [metric.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM readings WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Format the reading for display
    pub fn format_value(&self) -> String {
        let Some(value) = self.value else {
            return "\u{2014}".to_string();
        };
        match self.metric {
            Metric::BloodPressure => match self.value2 {
                Some(diastolic) => {
                    format!("{:.0}/{:.0} {}", value, diastolic, self.unit)
                }
                None => format!("{:.0} {}", value, self.unit),
            },
            Metric::Glucose | Metric::Weight => format!("{:.1} {}", value, self.unit),
            Metric::Insulin => format!("{} {}", value, self.unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn add(conn: &Connection, metric: Metric, at: &str, value: Option<f64>) -> Reading {
        Reading::create(
            conn,
            &ReadingCreate {
                metric,
                recorded_at: Some(at.to_string()),
                value,
                value2: None,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!(Metric::from_str("glucose"), Some(Metric::Glucose));
        assert_eq!(Metric::from_str("blood-pressure"), Some(Metric::BloodPressure));
        assert_eq!(Metric::from_str("BP"), Some(Metric::BloodPressure));
        assert_eq!(Metric::from_str("heart_rate"), None);
    }

    #[test]
    fn test_create_uses_default_unit() {
        let conn = conn();
        let reading = add(&conn, Metric::Glucose, "2026-10-19T08:00:00", Some(6.2));
        assert_eq!(reading.unit, "mmol/L");
        assert_eq!(reading.value, Some(6.2));
        assert_eq!(reading.format_value(), "6.2 mmol/L");
    }

    #[test]
    fn test_create_rejects_negative_value() {
        let conn = conn();
        let result = Reading::create(
            &conn,
            &ReadingCreate {
                metric: Metric::Weight,
                recorded_at: None,
                value: Some(-1.0),
                value2: None,
                notes: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_list_by_metric_most_recent_first() {
        let conn = conn();
        add(&conn, Metric::Glucose, "2026-10-17T08:00:00", Some(5.0));
        add(&conn, Metric::Glucose, "2026-10-19T08:00:00", Some(7.0));
        add(&conn, Metric::Glucose, "2026-10-18T08:00:00", Some(6.0));
        add(&conn, Metric::Weight, "2026-10-19T08:00:00", Some(80.0));

        let all = Reading::list_by_metric(&conn, Metric::Glucose, None).unwrap();
        let values: Vec<Option<f64>> = all.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(7.0), Some(6.0), Some(5.0)]);

        let limited = Reading::list_by_metric(&conn, Metric::Glucose, Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(Reading::count_by_metric(&conn, Metric::Weight).unwrap(), 1);
    }

    #[test]
    fn test_missing_value_and_latest() {
        let conn = conn();
        add(&conn, Metric::Weight, "2026-10-18T08:00:00", Some(81.5));
        let missing = add(&conn, Metric::Weight, "2026-10-19T08:00:00", None);
        assert_eq!(missing.format_value(), "\u{2014}");

        let latest = Reading::latest_with_value(&conn, Metric::Weight).unwrap().unwrap();
        assert_eq!(latest.value, Some(81.5));
    }

    #[test]
    fn test_blood_pressure_keeps_diastolic() {
        let conn = conn();
        let bp = Reading::create(
            &conn,
            &ReadingCreate {
                metric: Metric::BloodPressure,
                recorded_at: Some("2026-10-19T08:00:00".to_string()),
                value: Some(128.0),
                value2: Some(82.0),
                notes: None,
            },
        )
        .unwrap();
        assert_eq!(bp.format_value(), "128/82 mmHg");

        assert!(Reading::delete(&conn, bp.id).unwrap());
        assert!(!Reading::delete(&conn, bp.id).unwrap());
    }

    #[test]
    fn test_timestamps_stored_canonically() {
        let conn = conn();
        add(&conn, Metric::Weight, "2026-10-19T06:00:00", Some(100.0));
        let late = add(&conn, Metric::Weight, "2026-10-19 22:00:00", Some(70.0));
        assert_eq!(late.recorded_at, "2026-10-19T22:00:00");

        let day_only = add(&conn, Metric::Glucose, "2026-10-18", Some(6.0));
        assert_eq!(day_only.recorded_at, "2026-10-18T00:00:00");
        let with_offset = add(&conn, Metric::Glucose, "2026-10-19T23:00:00+02:00", Some(7.0));
        assert_eq!(with_offset.recorded_at, "2026-10-19T23:00:00");

        let latest = Reading::latest_with_value(&conn, Metric::Weight).unwrap().unwrap();
        assert_eq!(latest.value, Some(70.0));
        let glucose = Reading::list_by_metric(&conn, Metric::Glucose, None).unwrap();
        assert_eq!(glucose[0].value, Some(7.0));
    }

    #[test]
    fn test_create_rejects_unparseable_timestamp() {
        let conn = conn();
        let result = Reading::create(
            &conn,
            &ReadingCreate {
                metric: Metric::Glucose,
                recorded_at: Some("last tuesday".to_string()),
                value: Some(6.0),
                value2: None,
                notes: None,
            },
        );
        assert!(matches!(result, Err(DbError::InvalidValue { field: "recorded_at", .. })));
    }
}
