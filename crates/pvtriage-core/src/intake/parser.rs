//! Report parsing from YAML/JSON.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::schema::validate_report_schema;
use crate::types::PartialReport;

/// Errors that can occur when reading intake documents.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report failed schema validation: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),
}

impl PartialReport {
    /// Parse a report from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, IntakeError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a report from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, IntakeError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a report from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a report from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a report file, choosing the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let path = path.as_ref();
        match DocumentFormat::of(path)? {
            DocumentFormat::Json => Self::from_json_file(path),
            DocumentFormat::Yaml => Self::from_yaml_file(path),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, IntakeError> {
        validate_report_schema(&value).map_err(IntakeError::Schema)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Parse a YAML sequence of reports.
pub fn parse_batch_yaml(yaml: &str) -> Result<Vec<PartialReport>, IntakeError> {
    let values: Vec<serde_json::Value> = serde_yaml::from_str(yaml)?;
    parse_batch(values)
}

/// Parse a JSON array of reports.
pub fn parse_batch_json(json: &str) -> Result<Vec<PartialReport>, IntakeError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    parse_batch(values)
}

fn parse_batch(values: Vec<serde_json::Value>) -> Result<Vec<PartialReport>, IntakeError> {
    let mut errors = Vec::new();
    for (index, value) in values.iter().enumerate() {
        if let Err(violations) = validate_report_schema(value) {
            errors.extend(
                violations
                    .into_iter()
                    .map(|violation| format!("report[{index}]: {violation}")),
            );
        }
    }
    if !errors.is_empty() {
        return Err(IntakeError::Schema(errors));
    }

    let reports = values
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<PartialReport>, _>>()?;
    tracing::debug!(count = reports.len(), "report batch parsed");
    Ok(reports)
}

enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    fn of(path: &Path) -> Result<Self, IntakeError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(IntakeError::UnsupportedFormat(path.display().to_string())),
        }
    }
}
