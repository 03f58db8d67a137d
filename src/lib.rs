//! DiaReport Library
//!
//! Diabetes readings, clinical observations and HTML/PDF patient reports.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod report;
pub mod tools;
