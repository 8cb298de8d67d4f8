//! Case assembly and re-evaluation.
//!
//! The checker always runs first; its list feeds the classifier and the
//! router. Derived fields on [`AdverseEventReport`] are only written here.

use chrono::NaiveDate;
use serde::Serialize;

use crate::completeness::detect_missing_fields;
use crate::priority::{classify_case, Classification};
use crate::routing::decide_followup_recipient;
use crate::types::{
    AdverseEventReport, CasePriority, CaseStatus, ClinicalFacts, FollowUpRecipient, MissingField,
    PartialReport, ReporterType, Seriousness,
};

/// Drug name recorded when intake could not identify the product.
pub const UNIDENTIFIED_DRUG: &str = "Unidentified Drug";

/// Output of one full pass of the three decision functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triage {
    pub missing_fields: Vec<MissingField>,
    pub classification: Classification,
    pub followup_recipient: FollowUpRecipient,
}

/// Run the checker, then the classifier and router on its output.
pub fn triage(report: &impl ClinicalFacts) -> Triage {
    let missing_fields = detect_missing_fields(report);
    triage_with(report, missing_fields)
}

fn triage_with(report: &impl ClinicalFacts, missing_fields: Vec<MissingField>) -> Triage {
    let classification = classify_case(report, &missing_fields);
    let followup_recipient = decide_followup_recipient(report, &missing_fields);
    Triage {
        missing_fields,
        classification,
        followup_recipient,
    }
}

impl AdverseEventReport {
    /// Build a case record from a partial report.
    ///
    /// Defaults: reporter Consumer, drug [`UNIDENTIFIED_DRUG`], empty
    /// description, not hospitalized, seriousness derived from
    /// hospitalization, status New. Any `id` or `date_received` on the
    /// partial report is ignored in favour of the arguments.
    pub fn assemble(partial: PartialReport, id: impl Into<String>, date_received: NaiveDate) -> Self {
        let hospitalized = partial.hospitalized.unwrap_or(false);
        let seriousness = partial.seriousness.unwrap_or(if hospitalized {
            Seriousness::Serious
        } else {
            Seriousness::NonSerious
        });

        let mut record = Self {
            id: id.into(),
            date_received,
            reporter_type: partial.reporter_type.unwrap_or(ReporterType::Consumer),
            patient_age: partial.patient_age,
            gender: partial.gender,
            drug_name: partial
                .drug_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNIDENTIFIED_DRUG.to_string()),
            dose: partial.dose,
            event_description: partial.event_description.unwrap_or_default(),
            seriousness,
            hospitalized,
            event_start_date: partial.event_start_date,
            outcome: partial.outcome,
            status: partial.status.unwrap_or(CaseStatus::New),
            priority: CasePriority::Low,
            followup_recipient: FollowUpRecipient::None,
            missing_fields: Vec::new(),
        };
        record.recompute();

        tracing::debug!(
            case_id = %record.id,
            priority = %record.priority,
            recipient = %record.followup_recipient,
            missing = record.missing_fields.len(),
            "case assembled"
        );
        record
    }

    /// Re-derive missing fields, priority and follow-up recipient.
    ///
    /// A Closed case has its missing list forced empty; priority and
    /// recipient are then derived from that empty list.
    pub fn recompute(&mut self) {
        let missing = if self.status.is_terminal() {
            Vec::new()
        } else {
            detect_missing_fields(self)
        };
        let result = triage_with(self, missing);

        self.missing_fields = result.missing_fields;
        self.priority = result.classification.priority;
        self.followup_recipient = result.followup_recipient;
    }

    /// Current triage of the record, including the audit rationale.
    pub fn triage(&self) -> Triage {
        triage_with(self, self.missing_fields.clone())
    }

    /// Priority rationale for display.
    pub fn classification(&self) -> Classification {
        classify_case(self, &self.missing_fields)
    }

    /// Overlay the clinical fields supplied in `update`, then recompute.
    ///
    /// `id` and `date_received` are identity/provenance and are never
    /// patched. A supplied `status` is applied like [`set_status`](Self::set_status).
    pub fn apply(&mut self, update: PartialReport) {
        let PartialReport {
            id: _,
            date_received: _,
            reporter_type,
            patient_age,
            gender,
            drug_name,
            dose,
            event_description,
            seriousness,
            hospitalized,
            event_start_date,
            outcome,
            status,
        } = update;

        if let Some(value) = reporter_type {
            self.reporter_type = value;
        }
        if patient_age.is_some() {
            self.patient_age = patient_age;
        }
        if gender.is_some() {
            self.gender = gender;
        }
        if let Some(value) = drug_name.filter(|name| !name.is_empty()) {
            self.drug_name = value;
        }
        if dose.is_some() {
            self.dose = dose;
        }
        if let Some(value) = event_description {
            self.event_description = value;
        }
        if let Some(value) = seriousness {
            self.seriousness = value;
        }
        if let Some(value) = hospitalized {
            self.hospitalized = value;
        }
        if event_start_date.is_some() {
            self.event_start_date = event_start_date;
        }
        if outcome.is_some() {
            self.outcome = outcome;
        }
        if let Some(value) = status {
            self.status = value;
        }

        self.recompute();
    }

    /// Move the case to `status` and recompute its derived fields.
    ///
    /// Closing empties the missing list, so a case held at Medium only for
    /// missing data drops to Low; serious or hospitalized cases stay High.
    pub fn set_status(&mut self, status: CaseStatus) {
        self.status = status;
        self.recompute();
    }
}
