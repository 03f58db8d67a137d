//! Utility to set the patient profile in the database
//!
//! Usage: set_patient_info <first_name> <last_name> <diabetes_type> <status> [key=value ...]
//!
//! Optional keys: patient_id, diagnosis_date, activity_level, height_cm, a1c,
//! compliance, meals_per_day, insulin_injections

use std::collections::HashMap;

use diareport::config::Config;
use diareport::db::{migrations, Database};
use diareport::tools::patient::{set_patient_profile, ProfileInput};

const USAGE: &str = "Usage: set_patient_info <first_name> <last_name> <diabetes_type> <status> [key=value ...]";

fn parse_number<T: std::str::FromStr>(
    options: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, String> {
    options
        .get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| format!("Invalid number for {}: '{}'", key, raw))
        })
        .transpose()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 4 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let mut options = HashMap::new();
    for arg in &args[4..] {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{}'", arg))?;
        options.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    let input = ProfileInput {
        patient_id: options.get("patient_id").map(String::as_str).unwrap_or(""),
        first_name: &args[0],
        last_name: &args[1],
        diabetes_type: &args[2],
        status: &args[3],
        diagnosis_date: options.get("diagnosis_date").map(String::as_str),
        activity_level: options.get("activity_level").map(String::as_str),
        height_cm: parse_number(&options, "height_cm")?,
        a1c: parse_number(&options, "a1c")?,
        compliance: parse_number(&options, "compliance")?,
        meals_per_day: parse_number(&options, "meals_per_day")?,
        insulin_injections: parse_number(&options, "insulin_injections")?,
    };

    let profile = set_patient_profile(&database, &input)?;
    println!("Patient profile set:");
    println!("  Name: {} {}", profile.first_name, profile.last_name);
    println!("  Diabetes type: {}", profile.diabetes_type_display);
    println!("  Status: {}", profile.status);
    if let Some(bmi) = profile.bmi {
        println!("  BMI: {:.1}", bmi);
    }
    println!("  Updated: {}", profile.updated_at);

    Ok(())
}
