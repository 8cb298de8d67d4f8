//! Free-text intake: extract, then hand the facts to the deterministic core.
//!
//! The extractor only ever contributes facts. Missing fields, priority and
//! follow-up recipient are derived by `pvtriage-core` when the case is
//! ingested; the model's own view travels alongside as an
//! [`AdvisoryAssessment`] for audit display.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use pvtriage_core::{AdverseEventReport, CasePriority, CaseStore, MissingField, StoreError};

use crate::extraction::{AdvisoryAssessment, ExtractionError, ReportExtractor};

/// Errors from free-text intake. Nothing is stored when any of these occur.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Report text is empty")]
    EmptyReport,

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Could not store case: {0}")]
    Store(#[from] StoreError),
}

/// Where the model's advisory view differs from the derived triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdvisoryDisagreement {
    Priority {
        advised: String,
        derived: CasePriority,
    },
    MissingFields {
        advised_only: Vec<String>,
        derived_only: Vec<MissingField>,
    },
}

/// Result of ingesting one free-text report.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub case_id: String,
    pub record: AdverseEventReport,
    pub advisory: AdvisoryAssessment,
}

impl IntakeOutcome {
    /// Compare the advisory assessment with the record's derived fields.
    pub fn advisory_disagreements(&self) -> Vec<AdvisoryDisagreement> {
        let mut disagreements = Vec::new();

        if let Some(advised) = &self.advisory.priority {
            let agrees = advised
                .parse::<CasePriority>()
                .is_ok_and(|p| p == self.record.priority);
            if !agrees {
                disagreements.push(AdvisoryDisagreement::Priority {
                    advised: advised.clone(),
                    derived: self.record.priority,
                });
            }
        }

        let advised_only: Vec<String> = self
            .advisory
            .missing_fields
            .iter()
            .filter(|label| {
                MissingField::from_label(label)
                    .map_or(true, |field| !self.record.missing_fields.contains(&field))
            })
            .cloned()
            .collect();
        let derived_only: Vec<MissingField> = self
            .record
            .missing_fields
            .iter()
            .copied()
            .filter(|field| !self.advisory.missing_fields.iter().any(|l| l == field.label()))
            .collect();
        if !advised_only.is_empty() || !derived_only.is_empty() {
            disagreements.push(AdvisoryDisagreement::MissingFields {
                advised_only,
                derived_only,
            });
        }

        disagreements
    }
}

/// Runs free-text reports through extraction into a case store.
#[derive(Debug)]
pub struct IntakePipeline {
    extractor: ReportExtractor,
}

impl IntakePipeline {
    pub fn new(extractor: ReportExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &ReportExtractor {
        &self.extractor
    }

    /// Extract facts from `text` and ingest them as a new case received `today`.
    ///
    /// A description the extractor left out is filled with the raw report
    /// text. Any id, receipt date or status in the extraction is discarded.
    pub async fn process(
        &self,
        text: &str,
        store: &mut CaseStore,
        today: NaiveDate,
    ) -> Result<IntakeOutcome, IntakeError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IntakeError::EmptyReport);
        }

        let extraction = self.extractor.extract(text).await?;
        let mut partial = extraction.detected;
        partial.id = None;
        partial.date_received = None;
        partial.status = None;
        if partial.event_description.is_none() {
            partial.event_description = Some(text.to_string());
        }

        let record = store.ingest(partial, today)?.clone();
        let outcome = IntakeOutcome {
            case_id: record.id.clone(),
            record,
            advisory: extraction.advisory,
        };

        let disagreements = outcome.advisory_disagreements();
        if !disagreements.is_empty() {
            tracing::info!(
                case_id = %outcome.case_id,
                disagreements = disagreements.len(),
                "advisory assessment differs from derived triage"
            );
        }
        Ok(outcome)
    }
}
