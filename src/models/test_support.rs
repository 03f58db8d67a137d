//! Shared fixtures for database-backed tests

use rusqlite::Connection;

use super::{
    ActivityLevel, DiabetesType, Metric, PatientProfile, PatientProfileSet, Reading,
    ReadingCreate, StatusTag,
};
use crate::db::migrations::run_migrations;

pub(crate) fn sample_profile() -> PatientProfileSet {
    PatientProfileSet {
        patient_id: "P-0001".to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        diabetes_type: DiabetesType::Type1,
        status: StatusTag::Critical,
        diagnosis_date: Some("2022-03-15".to_string()),
        activity_level: ActivityLevel::Moderate,
        height_cm: Some(180.0),
        a1c: Some(8.5),
        compliance: Some(75.0),
        meals_per_day: 4,
        insulin_injections: 3,
    }
}

pub(crate) fn migrated_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

pub(crate) fn record(conn: &Connection, metric: Metric, at: &str, value: Option<f64>) -> Reading {
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

/// Profile plus a small mixed set of readings around 2026-10-19
pub(crate) fn seeded_connection() -> Connection {
    let conn = migrated_connection();
    PatientProfile::set(&conn, &sample_profile()).unwrap();

    record(&conn, Metric::Glucose, "2026-10-13T08:00:00", Some(9.5));
    record(&conn, Metric::Glucose, "2026-10-15T08:00:00", Some(12.5));
    record(&conn, Metric::Glucose, "2026-10-17T08:00:00", Some(11.0));
    record(&conn, Metric::Glucose, "2026-10-19T07:30:00", Some(10.0));
    record(&conn, Metric::Glucose, "2026-10-19T19:30:00", Some(12.0));

    record(&conn, Metric::Weight, "2026-10-12T07:00:00", Some(99.0));
    record(&conn, Metric::Weight, "2026-10-19T07:00:00", Some(97.2));

    record(&conn, Metric::Insulin, "2026-10-19T07:45:00", Some(6.0));
    record(&conn, Metric::Insulin, "2026-10-19T19:45:00", Some(8.0));

    conn
}
