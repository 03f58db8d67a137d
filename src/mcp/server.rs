//! DiaReport MCP Server Implementation
//!
//! Implements the MCP server with all DiaReport tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::db::Database;
use crate::report::html::HtmlOptions;
use crate::report::DisplayPrecision;
use crate::tools::patient::{self, ProfileInput};
use crate::tools::readings;
use crate::tools::reports;
use crate::tools::status::StatusTracker;

/// DiaReport MCP Service
#[derive(Clone)]
pub struct DiaReportService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    config: Arc<Config>,
    tool_router: ToolRouter<DiaReportService>,
}

impl DiaReportService {
    pub fn new(config: Config, database: Database) -> Self {
        let tracker = StatusTracker::new(config.database_path.clone(), config.output_dir.clone());
        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            database,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// Precision from the request, else the configured default
    fn precision(&self, requested: Option<&str>) -> Result<DisplayPrecision, McpError> {
        match requested {
            Some(raw) => DisplayPrecision::parse(raw).ok_or_else(|| {
                McpError::invalid_params(
                    format!("Invalid precision: '{}'. Use 'raw' or 0-6 decimals", raw),
                    None,
                )
            }),
            None => Ok(self.config.display_precision),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Patient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetPatientProfileParams {
    /// Patient identifier shown on the PDF (optional)
    #[serde(default)]
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    /// type1, type2, gestational, or free text
    pub diabetes_type: String,
    /// critical, warning or stable
    pub status: String,
    /// YYYY-MM-DD
    pub diagnosis_date: Option<String>,
    /// low, moderate or high (default moderate)
    pub activity_level: Option<String>,
    pub height_cm: Option<f64>,
    /// Latest A1C in percent
    pub a1c: Option<f64>,
    /// Treatment compliance in percent (0-100)
    pub compliance: Option<f64>,
    /// Default 3
    pub meals_per_day: Option<i64>,
    /// Insulin injections per day (default 0)
    pub insulin_injections: Option<i64>,
}

// ============================================================================
// Reading Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddReadingParams {
    /// glucose (mmol/L), weight (kg), insulin (units) or blood_pressure (mmHg)
    pub metric: String,
    /// Measured value; omit to record a skipped measurement. Systolic for blood pressure.
    pub value: Option<f64>,
    /// Diastolic, blood pressure only
    pub value2: Option<f64>,
    /// ISO timestamp (default: now)
    pub recorded_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListReadingsParams {
    pub metric: String,
    /// Maximum number of readings (most recent first)
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteReadingParams {
    /// Reading ID to delete
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CountReadingsParams {
    pub metric: String,
    /// YYYY-MM-DD (default: today)
    pub date: Option<String>,
}

// ============================================================================
// Report Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReportStatisticsParams {
    /// "raw" or number of decimals, 0-6 (default from configuration)
    pub precision: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateHtmlReportParams {
    /// Rows per history table (default from configuration)
    pub history_limit: Option<usize>,
    /// "raw" or number of decimals, 0-6 (default from configuration)
    pub precision: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DiaReportService {
    // --- Status ---

    #[tool(description = "Get the current status of the DiaReport service including build info, database status, and process information")]
    async fn report_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        to_json(&status)
    }

    #[tool(description = "Get step-by-step instructions for recording diabetes data and generating reports. Call this when starting a session or when unsure how to use the tools.")]
    fn report_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::REPORT_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(REPORT_INSTRUCTIONS)]))
    }

    // --- Patient ---

    #[tool(description = "Create or replace the patient profile (name, diabetes type, clinical status and optional metrics)")]
    fn set_patient_profile(&self, Parameters(p): Parameters<SetPatientProfileParams>) -> Result<CallToolResult, McpError> {
        let input = ProfileInput {
            patient_id: &p.patient_id,
            first_name: &p.first_name,
            last_name: &p.last_name,
            diabetes_type: &p.diabetes_type,
            status: &p.status,
            diagnosis_date: p.diagnosis_date.as_deref(),
            activity_level: p.activity_level.as_deref(),
            height_cm: p.height_cm,
            a1c: p.a1c,
            compliance: p.compliance,
            meals_per_day: p.meals_per_day,
            insulin_injections: p.insulin_injections,
        };
        let result = patient::set_patient_profile(&self.database, &input).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the patient profile with the current BMI")]
    fn get_patient_profile(&self) -> Result<CallToolResult, McpError> {
        let result = patient::get_patient_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(profile) => to_json(&profile),
            None => Ok(CallToolResult::success(vec![Content::text(
                r#"{"error": "Patient profile not set. Call set_patient_profile first."}"#,
            )])),
        }
    }

    // --- Readings ---

    #[tool(description = "Record a glucose, weight, insulin or blood pressure reading")]
    fn add_reading(&self, Parameters(p): Parameters<AddReadingParams>) -> Result<CallToolResult, McpError> {
        let result = readings::add_reading(
            &self.database,
            &p.metric,
            p.value,
            p.value2,
            p.recorded_at.as_deref(),
            p.notes.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List readings of one metric, most recent first")]
    fn list_readings(&self, Parameters(p): Parameters<ListReadingsParams>) -> Result<CallToolResult, McpError> {
        let result = readings::list_readings(&self.database, &p.metric, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a reading by ID")]
    fn delete_reading(&self, Parameters(p): Parameters<DeleteReadingParams>) -> Result<CallToolResult, McpError> {
        let result = readings::delete_reading(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Count readings of a metric recorded on one calendar day (default today)")]
    fn count_readings_today(&self, Parameters(p): Parameters<CountReadingsParams>) -> Result<CallToolResult, McpError> {
        let result = readings::count_readings_today(&self.database, &p.metric, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Reports ---

    #[tool(description = "Get average, min, max and count for glucose, weight and insulin plus clinical observations")]
    fn get_report_statistics(&self, Parameters(p): Parameters<ReportStatisticsParams>) -> Result<CallToolResult, McpError> {
        let precision = self.precision(p.precision.as_deref())?;
        let result = reports::get_report_statistics(&self.database, precision)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Generate the HTML health report and save it to the output directory. Returns the file path.")]
    fn generate_html_report(&self, Parameters(p): Parameters<GenerateHtmlReportParams>) -> Result<CallToolResult, McpError> {
        let options = HtmlOptions {
            history_limit: p.history_limit.unwrap_or(self.config.history_limit),
            precision: self.precision(p.precision.as_deref())?,
        };
        let result = reports::generate_html_report(&self.database, &self.config.output_dir, &options)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Generate the two-page PDF health report (gauges, glucose charts, treatment plan) and save it to the output directory. Returns the file path.")]
    fn generate_pdf_report(&self) -> Result<CallToolResult, McpError> {
        let result = reports::generate_pdf_report(&self.database, &self.config.output_dir)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for DiaReportService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "diareport".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("DiaReport".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "DiaReport - Diabetes readings and patient health reports. \
                 IMPORTANT: Call report_instructions first. \
                 Patient: set_patient_profile/get_patient_profile. \
                 Readings: add_reading, list_readings, delete_reading, count_readings_today. \
                 Reports: get_report_statistics, generate_html_report, generate_pdf_report. \
                 Status: report_status."
                    .into(),
            ),
        }
    }
}
