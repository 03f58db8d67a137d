//! Clinical observation rules
//!
//! Every applicable rule fires; nothing short-circuits. The output order is
//! fixed: glucose, BMI, insulin, glucose count.

use serde::Serialize;

use super::stats::AggregateStats;

/// Average glucose above this (mmol/L) is flagged high
pub const GLUCOSE_HIGH_THRESHOLD: f64 = 10.0;
/// Average glucose below this (mmol/L) is flagged as a hypoglycemia risk
pub const GLUCOSE_LOW_THRESHOLD: f64 = 4.0;
pub const BMI_HIGH_THRESHOLD: f64 = 30.0;
pub const BMI_LOW_THRESHOLD: f64 = 18.5;

/// Separator used when observations are shown as one block of text
pub const OBSERVATION_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    HighGlucose,
    HypoglycemiaRisk,
    GlucoseInTarget,
    HighBmi,
    LowBmi,
    InsulinCount,
    GlucoseCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub kind: ObservationKind,
    pub text: String,
}

/// What the rules look at
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationInput {
    pub glucose: AggregateStats,
    pub bmi: Option<f64>,
    pub insulin_count: usize,
}

/// Evaluate all rules in order
pub fn evaluate(input: &ObservationInput) -> Vec<Observation> {
    let mut out = Vec::with_capacity(4);
    let avg = input.glucose.average;

    if avg > GLUCOSE_HIGH_THRESHOLD {
        out.push(Observation {
            kind: ObservationKind::HighGlucose,
            text: format!(
                "High average glucose ({:.1} mmol/L): consider adjusting the therapy.",
                avg
            ),
        });
    } else if avg < GLUCOSE_LOW_THRESHOLD {
        out.push(Observation {
            kind: ObservationKind::HypoglycemiaRisk,
            text: format!(
                "Low average glucose ({:.1} mmol/L): risk of hypoglycemia.",
                avg
            ),
        });
    } else {
        out.push(Observation {
            kind: ObservationKind::GlucoseInTarget,
            text: format!(
                "Average glucose ({:.1} mmol/L) is within the target range.",
                avg
            ),
        });
    }

    match input.bmi {
        Some(bmi) if bmi > BMI_HIGH_THRESHOLD => out.push(Observation {
            kind: ObservationKind::HighBmi,
            text: format!("High BMI ({:.1}): weight management is recommended.", bmi),
        }),
        Some(bmi) if bmi < BMI_LOW_THRESHOLD => out.push(Observation {
            kind: ObservationKind::LowBmi,
            text: format!("Low BMI ({:.1}): nutritional follow-up is recommended.", bmi),
        }),
        _ => {}
    }

    if input.insulin_count > 0 {
        out.push(Observation {
            kind: ObservationKind::InsulinCount,
            text: format!(
                "{} insulin injection{} recorded.",
                input.insulin_count,
                plural(input.insulin_count)
            ),
        });
    }

    out.push(Observation {
        kind: ObservationKind::GlucoseCount,
        text: format!(
            "{} glucose measurement{} recorded in total.",
            input.glucose.count,
            plural(input.glucose.count)
        ),
    });

    out
}

/// Observation lines in rule order
pub fn generate_observations(input: &ObservationInput) -> Vec<String> {
    evaluate(input).into_iter().map(|o| o.text).collect()
}

/// Observations joined into one display string
pub fn observations_text(lines: &[String]) -> String {
    lines.join(OBSERVATION_SEPARATOR)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
