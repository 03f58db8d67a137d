//! Health report generation
//!
//! Readings are aggregated ([`stats`]), turned into clinical flags
//! ([`observations`]) and rendered either as a standalone HTML document
//! ([`html`]) or as a two-page PDF drawn from vector primitives ([`pdf`]).

pub mod canvas;
pub mod charts;
pub mod context;
pub mod html;
pub mod observations;
pub mod pdf;
mod pdf_canvas;
pub mod stats;

use thiserror::Error;

use crate::db::DbError;

pub use context::{PatientReportContext, MGDL_PER_MMOLL};
pub use html::{html_report_filename, render_html_report, HTML_MIME_TYPE};
pub use observations::{generate_observations, observations_text, ObservationInput};
pub use pdf::{pdf_report_filename, render_pdf_report, PdfReportInput};
pub use stats::{
    compute_stats, count_matching_day, AggregateStats, DisplayPrecision, TimeSeriesReading,
};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("No patient profile has been set")]
    MissingProfile,

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
