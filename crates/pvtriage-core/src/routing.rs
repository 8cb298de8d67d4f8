//! Follow-up router.
//!
//! Decides who should receive a data-completion request. Rules, first match wins:
//! 1. Nothing missing → None
//! 2. Dosage or start date missing → Both
//! 3. Doctor reporter and demographics missing → Patient
//! 4. Patient reporter and clinical facts missing → Doctor
//! 5. Otherwise → Both
//!
//! Rules 3 and 4 test label sets that overlap the checker's output only in
//! part: "Medical History", "Seriousness" and "Hospitalization Details" are
//! never emitted by [`detect_missing_fields`](crate::detect_missing_fields).
//! They stay in the sets so callers that track those gaps route correctly.

use crate::types::{ClinicalFacts, FollowUpRecipient, MissingField, ReporterType};

/// Drug-exposure facts that always need cross-verification.
pub const DRUG_EXPOSURE_FIELDS: [MissingField; 2] =
    [MissingField::DrugDosage, MissingField::EventStartDate];

/// Demographics a clinician reporter usually cannot supply.
pub const DEMOGRAPHIC_FIELDS: [MissingField; 3] = [
    MissingField::PatientAge,
    MissingField::Gender,
    MissingField::MedicalHistory,
];

/// Clinical facts a patient reporter usually cannot supply.
pub const CLINICAL_FIELDS: [MissingField; 3] = [
    MissingField::EventOutcome,
    MissingField::Seriousness,
    MissingField::HospitalizationDetails,
];

/// Choose which party receives the follow-up request.
pub fn decide_followup_recipient(
    report: &impl ClinicalFacts,
    missing_fields: &[MissingField],
) -> FollowUpRecipient {
    let recipient = route(report.reporter_type(), missing_fields);
    tracing::debug!(
        recipient = %recipient,
        missing = missing_fields.len(),
        "follow-up routed"
    );
    recipient
}

fn route(reporter: Option<ReporterType>, missing_fields: &[MissingField]) -> FollowUpRecipient {
    let needs = |set: &[MissingField]| missing_fields.iter().any(|field| set.contains(field));

    if missing_fields.is_empty() {
        return FollowUpRecipient::None;
    }

    if needs(&DRUG_EXPOSURE_FIELDS) {
        return FollowUpRecipient::Both;
    }

    match reporter {
        Some(ReporterType::Doctor) if needs(&DEMOGRAPHIC_FIELDS) => FollowUpRecipient::Patient,
        Some(ReporterType::Patient) if needs(&CLINICAL_FIELDS) => FollowUpRecipient::Doctor,
        _ => FollowUpRecipient::Both,
    }
}
