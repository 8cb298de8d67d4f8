//! Field completeness checker.
//!
//! Reports which safety-relevant fields are absent, in a fixed order.

use crate::types::{ClinicalFacts, MissingField};

/// Descriptions shorter than this many characters are treated as missing.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Inspect a report and list its missing safety-relevant fields.
///
/// Labels are evaluated in this order: Patient Age, Gender, Drug Dosage,
/// Event Start Date, Event Outcome, Detailed Description. An age of zero
/// counts as missing; an empty string counts as missing.
pub fn detect_missing_fields(report: &impl ClinicalFacts) -> Vec<MissingField> {
    let mut missing = Vec::new();

    if report.patient_age().map_or(true, |age| age == 0) {
        missing.push(MissingField::PatientAge);
    }
    if is_blank(report.gender()) {
        missing.push(MissingField::Gender);
    }
    if is_blank(report.dose()) {
        missing.push(MissingField::DrugDosage);
    }
    if is_blank(report.event_start_date()) {
        missing.push(MissingField::EventStartDate);
    }
    if report.outcome().is_none() {
        missing.push(MissingField::EventOutcome);
    }
    if report
        .event_description()
        .map_or(true, |text| text.chars().count() < MIN_DESCRIPTION_CHARS)
    {
        missing.push(MissingField::DetailedDescription);
    }

    tracing::debug!(missing = missing.len(), "completeness check finished");
    missing
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}
