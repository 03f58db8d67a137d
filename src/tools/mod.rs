//! DiaReport Tools module
//!
//! MCP tool implementations for patient data and report generation.

pub mod patient;
pub mod readings;
pub mod reports;
pub mod status;
