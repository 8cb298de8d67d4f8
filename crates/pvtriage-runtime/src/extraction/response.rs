//! Parsing of the extraction model's reply.
//!
//! The reply is untrusted. Structure problems (not JSON, no
//! `detectedInfo` object) reject the whole reply; a single bad field is
//! dropped with a warning and the rest of the report is kept.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use pvtriage_core::{Outcome, PartialReport, ReporterType, Seriousness};

use super::ExtractionError;

lazy_static! {
    /// A reply wrapped in a Markdown code fence, with optional language tag.
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n?(.*?)\s*```\s*$").unwrap();
}

/// The model's own view of the case. Never used for triage decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryAssessment {
    pub missing_fields: Vec<String>,
    pub priority: Option<String>,
    pub reasoning: Option<String>,
}

/// Facts extracted from one free-text report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub detected: PartialReport,
    pub advisory: AdvisoryAssessment,
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fences(content: &str) -> &str {
    match CODE_FENCE.captures(content).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => content.trim(),
    }
}

/// Parse a raw model reply into an [`Extraction`].
pub fn parse_extraction(content: &str) -> Result<Extraction, ExtractionError> {
    let body = strip_code_fences(content);
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedResponse(format!("reply is not JSON: {}", e)))?;

    let root = value.as_object().ok_or_else(|| {
        ExtractionError::MalformedResponse("reply is not a JSON object".to_string())
    })?;
    let detected = root
        .get("detectedInfo")
        .and_then(JsonValue::as_object)
        .ok_or_else(|| {
            ExtractionError::MalformedResponse("reply has no detectedInfo object".to_string())
        })?;

    Ok(Extraction {
        detected: detected_report(detected),
        advisory: advisory(root),
    })
}

fn detected_report(fields: &Map<String, JsonValue>) -> PartialReport {
    PartialReport {
        reporter_type: label_field::<ReporterType>(fields, "reporter_type"),
        patient_age: age_field(fields),
        gender: text_field(fields, "gender"),
        drug_name: text_field(fields, "drug_name"),
        dose: text_field(fields, "dose"),
        event_description: text_field(fields, "event_description"),
        seriousness: label_field::<Seriousness>(fields, "seriousness"),
        hospitalized: bool_field(fields, "hospitalized"),
        event_start_date: text_field(fields, "event_start_date"),
        outcome: label_field::<Outcome>(fields, "outcome"),
        ..Default::default()
    }
}

fn advisory(root: &Map<String, JsonValue>) -> AdvisoryAssessment {
    let missing_fields = root
        .get("missingFields")
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    AdvisoryAssessment {
        missing_fields,
        priority: text_field(root, "priority"),
        reasoning: text_field(root, "reasoning"),
    }
}

fn text_field(fields: &Map<String, JsonValue>, key: &str) -> Option<String> {
    match fields.get(key)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Null | JsonValue::String(_) => None,
        other => {
            tracing::warn!(field = key, value = %other, "dropping non-text extracted field");
            None
        }
    }
}

fn label_field<T: FromStr>(fields: &Map<String, JsonValue>, key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let text = text_field(fields, key)?;
    match text.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(field = key, error = %e, "dropping unrecognised extracted label");
            None
        }
    }
}

fn bool_field(fields: &Map<String, JsonValue>, key: &str) -> Option<bool> {
    match fields.get(key)? {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Null => None,
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => {
                tracing::warn!(field = key, value = %s, "dropping non-boolean extracted field");
                None
            }
        },
        other => {
            tracing::warn!(field = key, value = %other, "dropping non-boolean extracted field");
            None
        }
    }
}

/// Ages must be positive whole numbers; anything else is dropped.
fn age_field(fields: &Map<String, JsonValue>) -> Option<u32> {
    let raw = fields.get("patient_age")?;
    let parsed = match raw {
        JsonValue::Null => return None,
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(age) if age.fract() == 0.0 && age >= 1.0 && age <= f64::from(u32::MAX) => {
            Some(age as u32)
        }
        _ => {
            tracing::warn!(value = %raw, "dropping invalid extracted patient age");
            None
        }
    }
}
