//! DiaReport Status Tool
//!
//! Provides runtime status information about the DiaReport service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage guide for AI assistants
pub const REPORT_INSTRUCTIONS: &str = r#"
# DiaReport Instructions

This guide explains how to record diabetes data and produce patient reports
with the DiaReport tools.

## Overview

A report needs:
1. **Patient profile** - Name, diabetes type, clinical status and optional clinical metrics
2. **Readings** - Time-stamped glucose, weight, insulin and blood pressure measurements
3. **A report** - Summary statistics, an HTML document or a two-page PDF

---

## 1. Set the Patient Profile

**Tool:** `set_patient_profile`

Only one profile is stored; calling the tool again replaces it.

| Field | Required | Notes |
|-------|----------|-------|
| `first_name`, `last_name` | yes | |
| `diabetes_type` | yes | `type1`, `type2`, `gestational`; any other text is shown verbatim |
| `status` | yes | `critical`, `warning` or `stable` |
| `patient_id` | no | Shown on the PDF patient card |
| `diagnosis_date` | no | YYYY-MM-DD |
| `activity_level` | no | `low`, `moderate` (default) or `high` |
| `height_cm` | no | Needed for BMI |
| `a1c` | no | Percent |
| `compliance` | no | Percent, 0-100 |
| `meals_per_day` | no | Default 3 |
| `insulin_injections` | no | Per day, default 0 |

---

## 2. Record Readings

**Tool:** `add_reading`

| Metric | Unit | Notes |
|--------|------|-------|
| `glucose` | mmol/L | Blood glucose |
| `weight` | kg | Latest weight drives BMI |
| `insulin` | units | Each reading counts as one injection |
| `blood_pressure` (`bp`) | mmHg | `value` = systolic, `value2` = diastolic |

- `recorded_at` defaults to now. Accepted formats: `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, RFC 3339.
- `value` may be omitted to record a skipped measurement; it is ignored by every statistic.

Other reading tools:
- `list_readings` - most recent first, optional `limit`
- `delete_reading` - by id
- `count_readings_today` - how many readings of a metric share a calendar day (default today)

---

## 3. Reports

**`get_report_statistics`** - average, min, max and count per metric plus clinical observations. No file is written.

**`generate_html_report`** - writes `report-<lastname>-<firstname>-<date>.html` to the output directory.
The report lists summary cards, the most recent readings per metric and the observations.

**`generate_pdf_report`** - writes `patient-report-<name>-<date>.pdf` to the output directory.
- Page 1: patient card, A1C / BMI / compliance gauges, weekly glucose chart, recommendations
- Page 2: six-month glucose trend, contributing factors, treatment plan

Charts show glucose in mg/dL (mmol/L x 18). Days without readings are skipped.

---

## Clinical Observations

| Rule | Trigger |
|------|---------|
| High glucose | Average above 10 mmol/L |
| Hypoglycemia risk | Average below 4 mmol/L (includes no readings at all) |
| Glucose in target | Otherwise |
| High / low BMI | BMI above 30 or below 18.5 |
| Insulin count | At least one insulin reading |
| Glucose count | Always |

Observations are informational and do not replace a clinician's judgement.

## Notes

- Dates use ISO format: YYYY-MM-DD
- Averages are rounded to the configured display precision (default 1 decimal)
- History tables show the configured number of most recent readings (default 7)
"#;

/// Runtime status of the DiaReport service
#[derive(Debug, Clone, Serialize)]
pub struct ReportStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Where generated reports are written
    pub output_dir: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    output_dir: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            output_dir,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> ReportStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ReportStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            output_dir: self.output_dir.display().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
