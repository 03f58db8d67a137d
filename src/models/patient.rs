//! Patient model
//!
//! Stores the patient profile used for report headers, gauges and
//! treatment-plan wording.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Diabetes classification.
///
/// Unrecognized tags are kept verbatim so they can be displayed as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiabetesType {
    Type1,
    Type2,
    Gestational,
    Other(String),
}

impl DiabetesType {
    pub fn from_tag(tag: &str) -> Self {
        let normalized: String = tag
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "type1" => DiabetesType::Type1,
            "type2" => DiabetesType::Type2,
            "gestational" => DiabetesType::Gestational,
            _ => DiabetesType::Other(tag.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            DiabetesType::Type1 => "type1",
            DiabetesType::Type2 => "type2",
            DiabetesType::Gestational => "gestational",
            DiabetesType::Other(tag) => tag,
        }
    }

    /// Human-readable label; unknown tags pass through unchanged
    pub fn display_label(&self) -> &str {
        match self {
            DiabetesType::Type1 => "Type 1",
            DiabetesType::Type2 => "Type 2",
            DiabetesType::Gestational => "Gestational",
            DiabetesType::Other(tag) => tag,
        }
    }
}

impl From<String> for DiabetesType {
    fn from(tag: String) -> Self {
        DiabetesType::from_tag(&tag)
    }
}

impl From<DiabetesType> for String {
    fn from(value: DiabetesType) -> Self {
        value.as_tag().to_string()
    }
}

/// Clinical severity label driving report colors and wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTag {
    Critical,
    Warning,
    Stable,
}

impl StatusTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTag::Critical => "critical",
            StatusTag::Warning => "warning",
            StatusTag::Stable => "stable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(StatusTag::Critical),
            "warning" => Some(StatusTag::Warning),
            "stable" => Some(StatusTag::Stable),
            _ => None,
        }
    }
}

/// Self-reported physical activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(ActivityLevel::Low),
            "moderate" | "medium" => Some(ActivityLevel::Moderate),
            "high" => Some(ActivityLevel::High),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "Low",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::High => "High",
        }
    }
}

/// Patient profile (single row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub diabetes_type: DiabetesType,
    pub status: StatusTag,
    pub diagnosis_date: Option<String>,
    pub activity_level: ActivityLevel,
    pub height_cm: Option<f64>,
    pub a1c: Option<f64>,
    pub compliance: Option<f64>,
    pub meals_per_day: i64,
    pub insulin_injections: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating or replacing the patient profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfileSet {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub diabetes_type: DiabetesType,
    pub status: StatusTag,
    pub diagnosis_date: Option<String>,
    pub activity_level: ActivityLevel,
    pub height_cm: Option<f64>,
    pub a1c: Option<f64>,
    pub compliance: Option<f64>,
    pub meals_per_day: i64,
    pub insulin_injections: i64,
}

impl PatientProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let diabetes_type: String = row.get("diabetes_type")?;
        let status: String = row.get("status")?;
        let activity: String = row.get("activity_level")?;

        Ok(Self {
            patient_id: row.get("patient_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            diabetes_type: DiabetesType::from_tag(&diabetes_type),
            status: StatusTag::from_str(&status).unwrap_or(StatusTag::Stable),
            diagnosis_date: row.get("diagnosis_date")?,
            activity_level: ActivityLevel::from_str(&activity).unwrap_or(ActivityLevel::Moderate),
            height_cm: row.get("height_cm")?,
            a1c: row.get("a1c")?,
            compliance: row.get("compliance")?,
            meals_per_day: row.get("meals_per_day")?,
            insulin_injections: row.get("insulin_injections")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the patient profile, if one has been set
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let profile = conn
            .query_row("SELECT * FROM patient_profile WHERE id = 1", [], Self::from_row)
            .optional()?;
        Ok(profile)
    }

    /// Set or replace the patient profile (upsert)
    pub fn set(conn: &Connection, data: &PatientProfileSet) -> DbResult<Self> {
        if let Some(compliance) = data.compliance {
            if !(0.0..=100.0).contains(&compliance) {
                return Err(DbError::InvalidValue {
                    field: "compliance",
                    value: compliance.to_string(),
                });
            }
        }
        if data.meals_per_day < 0 || data.insulin_injections < 0 {
            return Err(DbError::InvalidValue {
                field: "meals_per_day/insulin_injections",
                value: format!("{}/{}", data.meals_per_day, data.insulin_injections),
            });
        }

        conn.execute(
            r#"
            INSERT INTO patient_profile (
                id, patient_id, first_name, last_name, diabetes_type, status,
                diagnosis_date, activity_level, height_cm, a1c, compliance,
                meals_per_day, insulin_injections
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                patient_id = excluded.patient_id,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                diabetes_type = excluded.diabetes_type,
                status = excluded.status,
                diagnosis_date = excluded.diagnosis_date,
                activity_level = excluded.activity_level,
                height_cm = excluded.height_cm,
                a1c = excluded.a1c,
                compliance = excluded.compliance,
                meals_per_day = excluded.meals_per_day,
                insulin_injections = excluded.insulin_injections,
                updated_at = datetime('now')
            "#,
            params![
                data.patient_id,
                data.first_name,
                data.last_name,
                data.diabetes_type.as_tag(),
                data.status.as_str(),
                data.diagnosis_date,
                data.activity_level.as_str(),
                data.height_cm,
                data.a1c,
                data.compliance,
                data.meals_per_day,
                data.insulin_injections,
            ],
        )?;

        Self::get(conn)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Body mass index from the stored height and a weight in kilograms
    pub fn bmi(&self, weight_kg: f64) -> Option<f64> {
        let height_m = self.height_cm? / 100.0;
        if height_m <= 0.0 || weight_kg <= 0.0 {
            return None;
        }
        Some(weight_kg / (height_m * height_m))
    }
}
