//! Patient profile tools

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{
    ActivityLevel, DiabetesType, Metric, PatientProfile, PatientProfileSet, Reading, StatusTag,
};

/// Profile as returned to the client
#[derive(Debug, Serialize)]
pub struct PatientProfileResponse {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub diabetes_type: String,
    pub diabetes_type_display: String,
    pub status: String,
    pub diagnosis_date: Option<String>,
    pub activity_level: String,
    pub height_cm: Option<f64>,
    pub a1c: Option<f64>,
    pub compliance: Option<f64>,
    pub meals_per_day: i64,
    pub insulin_injections: i64,
    /// From height and the latest weight reading
    pub bmi: Option<f64>,
    pub updated_at: String,
}

impl PatientProfileResponse {
    fn new(profile: PatientProfile, bmi: Option<f64>) -> Self {
        Self {
            patient_id: profile.patient_id,
            diabetes_type: profile.diabetes_type.as_tag().to_string(),
            diabetes_type_display: profile.diabetes_type.display_label().to_string(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            status: profile.status.as_str().to_string(),
            diagnosis_date: profile.diagnosis_date,
            activity_level: profile.activity_level.as_str().to_string(),
            height_cm: profile.height_cm,
            a1c: profile.a1c,
            compliance: profile.compliance,
            meals_per_day: profile.meals_per_day,
            insulin_injections: profile.insulin_injections,
            bmi: bmi.map(|b| (b * 10.0).round() / 10.0),
            updated_at: profile.updated_at,
        }
    }
}

/// Fields accepted by set_patient_profile
#[derive(Debug, Clone, Default)]
pub struct ProfileInput<'a> {
    pub patient_id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub diabetes_type: &'a str,
    pub status: &'a str,
    pub diagnosis_date: Option<&'a str>,
    pub activity_level: Option<&'a str>,
    pub height_cm: Option<f64>,
    pub a1c: Option<f64>,
    pub compliance: Option<f64>,
    pub meals_per_day: Option<i64>,
    pub insulin_injections: Option<i64>,
}

/// Create or replace the patient profile
pub fn set_patient_profile(
    db: &Database,
    input: &ProfileInput,
) -> Result<PatientProfileResponse, String> {
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err("First and last name are required".to_string());
    }

    let status = StatusTag::from_str(input.status).ok_or_else(|| {
        format!(
            "Invalid status: '{}'. Valid values: critical, warning, stable",
            input.status
        )
    })?;

    let activity_level = match input.activity_level {
        Some(raw) => ActivityLevel::from_str(raw).ok_or_else(|| {
            format!("Invalid activity level: '{}'. Valid values: low, moderate, high", raw)
        })?,
        None => ActivityLevel::Moderate,
    };

    if let Some(date) = input.diagnosis_date {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| format!("Invalid diagnosis date: '{}'. Use YYYY-MM-DD", date))?;
    }

    if let Some(height) = input.height_cm {
        if height <= 0.0 {
            return Err("Height must be greater than 0".to_string());
        }
    }

    let data = PatientProfileSet {
        patient_id: input.patient_id.trim().to_string(),
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        diabetes_type: DiabetesType::from_tag(input.diabetes_type),
        status,
        diagnosis_date: input.diagnosis_date.map(String::from),
        activity_level,
        height_cm: input.height_cm,
        a1c: input.a1c,
        compliance: input.compliance,
        meals_per_day: input.meals_per_day.unwrap_or(3),
        insulin_injections: input.insulin_injections.unwrap_or(0),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = PatientProfile::set(&conn, &data)
        .map_err(|e| format!("Failed to save patient profile: {}", e))?;

    tracing::info!("Patient profile saved for {}", profile.full_name());

    let bmi = current_bmi(&conn, &profile)?;
    Ok(PatientProfileResponse::new(profile, bmi))
}

/// Get the patient profile, if one has been set
pub fn get_patient_profile(db: &Database) -> Result<Option<PatientProfileResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = PatientProfile::get(&conn)
        .map_err(|e| format!("Failed to get patient profile: {}", e))?;

    match profile {
        Some(p) => {
            let bmi = current_bmi(&conn, &p)?;
            Ok(Some(PatientProfileResponse::new(p, bmi)))
        }
        None => Ok(None),
    }
}

fn current_bmi(conn: &rusqlite::Connection, profile: &PatientProfile) -> Result<Option<f64>, String> {
    let latest = Reading::latest_with_value(conn, Metric::Weight)
        .map_err(|e| format!("Failed to get latest weight: {}", e))?;
    Ok(latest.and_then(|r| r.value).and_then(|kg| profile.bmi(kg)))
}
