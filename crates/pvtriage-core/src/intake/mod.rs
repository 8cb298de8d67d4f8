//! Intake document parsing and validation.
//!
//! Reports arrive as YAML or JSON documents. Each document is checked
//! against the embedded report schema before it is deserialised, so a bad
//! document is rejected whole and never reaches the decision functions.

mod parser;
mod schema;

pub use parser::{parse_batch_json, parse_batch_yaml, IntakeError};
pub use schema::{is_valid_report, validate_report_schema};
