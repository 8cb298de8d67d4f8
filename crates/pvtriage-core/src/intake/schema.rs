//! JSON Schema validation for intake documents.
//!
//! Reports are validated against schema/report.schema.json.

use std::sync::OnceLock;

/// Embedded report schema (loaded at compile time).
const REPORT_SCHEMA_JSON: &str = include_str!("../../../../schema/report.schema.json");

/// Compiled validator, built on first use.
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, String> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(REPORT_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result.as_ref().map_err(Clone::clone)
}

/// Validate one report document.
///
/// Returns every violation, each suffixed with its instance path.
pub fn validate_report_schema(report_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(report_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick validity check without error detail.
pub fn is_valid_report(report_json: &serde_json::Value) -> bool {
    get_validator()
        .map(|v| v.is_valid(report_json))
        .unwrap_or(false)
}
