//! Data models
//!
//! Rust structs representing database entities.

mod patient;
mod reading;

#[cfg(test)]
pub(crate) mod test_support;

pub use patient::{ActivityLevel, DiabetesType, PatientProfile, PatientProfileSet, StatusTag};
pub use reading::{Metric, Reading, ReadingCreate};
