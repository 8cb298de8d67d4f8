//! Follow-up outreach.
//!
//! Turns a routed case into the artefacts a reviewer sends out: which
//! follow-up form to open, which gaps each form can close, the five-item
//! safety checklist, and the outreach letters for the routed recipient.

use serde::Serialize;

use crate::completeness::detect_missing_fields;
use crate::types::{AdverseEventReport, FollowUpRecipient, MissingField};

/// Structured follow-up questionnaire sent to one party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FollowUpForm {
    Patient,
    Doctor,
}

const PATIENT_FORM_FIELDS: [MissingField; 4] = [
    MissingField::EventOutcome,
    MissingField::DetailedDescription,
    MissingField::PatientAge,
    MissingField::Gender,
];

const DOCTOR_FORM_FIELDS: [MissingField; 5] = [
    MissingField::Seriousness,
    MissingField::EventOutcome,
    MissingField::DrugDosage,
    MissingField::EventStartDate,
    MissingField::DetailedDescription,
];

impl FollowUpForm {
    /// Form opened first for a routed recipient.
    ///
    /// A case routed to both parties starts with the clinician form.
    pub fn initial(recipient: FollowUpRecipient) -> Option<Self> {
        match recipient {
            FollowUpRecipient::Patient => Some(FollowUpForm::Patient),
            FollowUpRecipient::Doctor | FollowUpRecipient::Both => Some(FollowUpForm::Doctor),
            FollowUpRecipient::None => None,
        }
    }

    /// Missing-field labels this form asks about.
    pub fn fields(&self) -> &'static [MissingField] {
        match self {
            FollowUpForm::Patient => &PATIENT_FORM_FIELDS,
            FollowUpForm::Doctor => &DOCTOR_FORM_FIELDS,
        }
    }

    /// Gaps on `report` this form can close, in the record's order.
    pub fn outstanding(&self, report: &AdverseEventReport) -> Vec<MissingField> {
        report
            .missing_fields
            .iter()
            .copied()
            .filter(|field| self.fields().contains(field))
            .collect()
    }
}

/// Fields every submission must carry before regulatory filing.
pub const SAFETY_CHECKLIST: [MissingField; 5] = [
    MissingField::PatientAge,
    MissingField::Gender,
    MissingField::DrugDosage,
    MissingField::EventStartDate,
    MissingField::EventOutcome,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub field: MissingField,
    pub label: &'static str,
    pub satisfied: bool,
}

/// Evaluate the safety checklist against the record's current data.
///
/// Checks the data itself, so a closed case still shows gaps it was
/// closed with.
pub fn safety_checklist(report: &AdverseEventReport) -> Vec<ChecklistItem> {
    let missing = detect_missing_fields(report);
    SAFETY_CHECKLIST
        .iter()
        .map(|field| ChecklistItem {
            field: *field,
            label: field.label(),
            satisfied: !missing.contains(field),
        })
        .collect()
}

/// A rendered follow-up letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUpLetter {
    pub recipient: FollowUpForm,
    pub subject: String,
    pub body: String,
}

impl FollowUpLetter {
    /// Plain-language check-in addressed to the patient.
    pub fn patient(report: &AdverseEventReport) -> Self {
        let body = format!(
            "Dear Valued Patient,\n\n\
             We received a report about your experience with {drug} on {received}.\n\n\
             Patient safety is our highest priority. We would like to learn a little more \
             about how you are feeling so we can better understand this medicine.\n\n\
             Could you take less than 2 minutes to confirm a few details? Your answers are \
             kept confidential and used only for safety monitoring.\n\n\
             Thank you for helping us keep this treatment safe.\n\n\
             Best regards,\n\
             The Global Safety Team",
            drug = report.drug_name,
            received = report.date_received,
        );
        Self {
            recipient: FollowUpForm::Patient,
            subject: "Important follow-up regarding your recent health report".to_string(),
            body,
        }
    }

    /// Regulatory follow-up request addressed to the treating clinician.
    pub fn doctor(report: &AdverseEventReport) -> Self {
        let body = format!(
            "Dear Healthcare Professional,\n\n\
             In line with pharmacovigilance regulatory requirements we are following up an \
             adverse event involving {drug} reported from your facility.\n\n\
             Please confirm the patient's current status and the clinical details of the \
             event reported on {received}. The structured form takes under 60 seconds.\n\n\
             Internal reference: {id} / MED-QUERY\n\n\
             Respectfully,\n\
             Pharmacovigilance Department",
            drug = report.drug_name,
            received = report.date_received,
            id = report.id,
        );
        Self {
            recipient: FollowUpForm::Doctor,
            subject: format!("Required Clinical Follow-up: Adverse Event Case [{}]", report.id),
            body,
        }
    }
}

/// Letters for the record's routed recipient.
pub fn letters_for(report: &AdverseEventReport) -> Vec<FollowUpLetter> {
    let recipient = report.followup_recipient;
    let mut letters = Vec::new();
    if recipient.includes_patient() {
        letters.push(FollowUpLetter::patient(report));
    }
    if recipient.includes_doctor() {
        letters.push(FollowUpLetter::doctor(report));
    }
    letters
}
