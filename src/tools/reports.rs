//! Report generation tools
//!
//! Summary statistics plus HTML and PDF reports written to the output directory.

use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::db::Database;
use crate::report::html::{render_html_report_with, HtmlOptions};
use crate::report::{
    generate_observations, html_report_filename, observations_text, pdf_report_filename,
    render_pdf_report,
    AggregateStats, DisplayPrecision, PatientReportContext, PdfReportInput, ReportError,
    HTML_MIME_TYPE,
};

const PDF_MIME_TYPE: &str = "application/pdf";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ReportStatisticsResponse {
    pub patient_name: String,
    pub diabetes_type: String,
    pub glucose: AggregateStats,
    pub weight: AggregateStats,
    pub insulin: AggregateStats,
    /// Blood pressure, mmHg
    pub systolic: AggregateStats,
    pub diastolic: AggregateStats,
    pub bmi: Option<f64>,
    pub observations: Vec<String>,
    /// Observations joined into one display block
    pub observations_text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub message: String,
}

fn report_failure(e: ReportError) -> String {
    tracing::error!("Report generation failed: {}", e);
    format!("Failed to generate report: {}", e)
}

// ============================================================================
// Tools
// ============================================================================

/// Aggregates and clinical observations without rendering a document
pub fn get_report_statistics(
    db: &Database,
    precision: DisplayPrecision,
) -> Result<ReportStatisticsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let ctx = PatientReportContext::from_database(&conn, 0).map_err(|e| e.to_string())?;

    let observations = generate_observations(&ctx.observation_input());

    Ok(ReportStatisticsResponse {
        patient_name: ctx.full_name(),
        diabetes_type: ctx.diabetes_type.display_label().to_string(),
        glucose: ctx.glucose.rounded(precision),
        weight: ctx.weight.rounded(precision),
        insulin: ctx.insulin.rounded(precision),
        systolic: ctx.systolic.rounded(precision),
        diastolic: ctx.diastolic.rounded(precision),
        bmi: ctx.bmi.map(|b| precision.apply(b)),
        observations_text: observations_text(&observations),
        observations,
    })
}

/// Render the HTML report and write it into `output_dir`
pub fn generate_html_report(
    db: &Database,
    output_dir: &Path,
    options: &HtmlOptions,
) -> Result<GenerateReportResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let ctx =
        PatientReportContext::from_database(&conn, options.history_limit).map_err(report_failure)?;

    let now = Local::now();
    let html = render_html_report_with(&ctx, now, options);
    let filename = html_report_filename(&ctx, now.date_naive());

    write_report(output_dir, &filename, html.as_bytes(), HTML_MIME_TYPE)
}

/// Render the two-page PDF report and write it into `output_dir`
pub fn generate_pdf_report(
    db: &Database,
    output_dir: &Path,
) -> Result<GenerateReportResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let now = Local::now();
    let input = PdfReportInput::from_database(&conn, now.date_naive()).map_err(report_failure)?;
    let bytes = render_pdf_report(&input, now).map_err(report_failure)?;
    let filename = pdf_report_filename(&input.patient_name, now.date_naive());

    write_report(output_dir, &filename, &bytes, PDF_MIME_TYPE)
}

/// The document is complete before anything touches the disk
fn write_report(
    output_dir: &Path,
    filename: &str,
    contents: &[u8],
    mime_type: &str,
) -> Result<GenerateReportResponse, String> {
    let path = output_dir.join(filename);
    std::fs::create_dir_all(output_dir)
        .and_then(|_| std::fs::write(&path, contents))
        .map_err(|e| report_failure(ReportError::Io(e)))?;

    tracing::info!("Wrote {} ({} bytes)", path.display(), contents.len());

    Ok(GenerateReportResponse {
        success: true,
        file_path: path.display().to_string(),
        filename: filename.to_string(),
        mime_type: mime_type.to_string(),
        size_bytes: contents.len(),
        message: format!("Report saved to {}", path.display()),
    })
}
