//! Priority classifier.
//!
//! Applies safety-first rules in a fixed order; the first match wins:
//! 1. Hospitalized or Serious → High
//! 2. More than three missing fields → Medium
//! 3. Description mentions a moderate symptom → Medium
//! 4. Otherwise → Low
//!
//! Rule 1 cannot be downgraded by anything later in the list.

use serde::{Deserialize, Serialize};

use crate::patterns::mentions_moderate_symptom;
use crate::types::{CasePriority, ClinicalFacts, MissingField, Seriousness};

/// More missing fields than this makes a case high-uncertainty.
pub const MISSING_FIELD_UNCERTAINTY_THRESHOLD: usize = 3;

/// The classifier rule that produced a priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityRule {
    SeriousOrHospitalized,
    ExcessiveMissingData,
    ModerateSymptoms,
    MinimalImpact,
}

impl PriorityRule {
    pub fn priority(&self) -> CasePriority {
        match self {
            PriorityRule::SeriousOrHospitalized => CasePriority::High,
            PriorityRule::ExcessiveMissingData | PriorityRule::ModerateSymptoms => {
                CasePriority::Medium
            }
            PriorityRule::MinimalImpact => CasePriority::Low,
        }
    }

    /// Fixed audit rationale shown verbatim to reviewers.
    pub fn reason(&self) -> &'static str {
        match self {
            PriorityRule::SeriousOrHospitalized => {
                "Case involves hospitalization or serious medical event (Rule: Priority = High for serious events)."
            }
            PriorityRule::ExcessiveMissingData => {
                "Multiple critical fields missing from report (Rule: Priority = Medium for high-uncertainty cases)."
            }
            PriorityRule::ModerateSymptoms => {
                "Symptom severity is moderate and requires investigation."
            }
            PriorityRule::MinimalImpact => {
                "Non-serious event with minimal clinical impact reported."
            }
        }
    }
}

/// Priority plus the rationale of the rule that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub priority: CasePriority,
    pub rule: PriorityRule,
    pub reason: &'static str,
}

impl From<PriorityRule> for Classification {
    fn from(rule: PriorityRule) -> Self {
        Self {
            priority: rule.priority(),
            rule,
            reason: rule.reason(),
        }
    }
}

/// Assign a priority to a report given its missing-field list.
pub fn classify_case(report: &impl ClinicalFacts, missing_fields: &[MissingField]) -> Classification {
    let rule = if report.hospitalized() || report.seriousness() == Some(Seriousness::Serious) {
        PriorityRule::SeriousOrHospitalized
    } else if missing_fields.len() > MISSING_FIELD_UNCERTAINTY_THRESHOLD {
        PriorityRule::ExcessiveMissingData
    } else if report
        .event_description()
        .is_some_and(mentions_moderate_symptom)
    {
        PriorityRule::ModerateSymptoms
    } else {
        PriorityRule::MinimalImpact
    };

    tracing::debug!(rule = ?rule, priority = %rule.priority(), "case classified");
    Classification::from(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PartialReport;

    fn non_serious(description: &str) -> PartialReport {
        PartialReport {
            seriousness: Some(Seriousness::NonSerious),
            hospitalized: Some(false),
            event_description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_hospitalization_is_high_even_with_nothing_missing() {
        let report = PartialReport {
            hospitalized: Some(true),
            seriousness: Some(Seriousness::NonSerious),
            ..Default::default()
        };
        let result = classify_case(&report, &[]);
        assert_eq!(result.priority, CasePriority::High);
        assert_eq!(result.rule, PriorityRule::SeriousOrHospitalized);
    }

    #[test]
    fn test_serious_is_high() {
        let report = PartialReport {
            seriousness: Some(Seriousness::Serious),
            ..Default::default()
        };
        assert_eq!(classify_case(&report, &[]).priority, CasePriority::High);
    }

    #[test]
    fn test_four_missing_fields_is_medium() {
        let missing = [
            MissingField::PatientAge,
            MissingField::Gender,
            MissingField::DrugDosage,
            MissingField::EventOutcome,
        ];
        let result = classify_case(&non_serious("Mild rash on forearm."), &missing);
        assert_eq!(result.priority, CasePriority::Medium);
        assert_eq!(result.rule, PriorityRule::ExcessiveMissingData);
        assert!(result.reason.starts_with("Multiple critical fields missing"));
    }

    #[test]
    fn test_three_missing_fields_does_not_trigger_uncertainty() {
        let missing = [
            MissingField::PatientAge,
            MissingField::Gender,
            MissingField::DrugDosage,
        ];
        let result = classify_case(&non_serious("Mild rash on forearm."), &missing);
        assert_eq!(result.rule, PriorityRule::MinimalImpact);
    }

    #[test]
    fn test_symptom_keywords_are_case_insensitive() {
        let result = classify_case(&non_serious("Sharp PAIN after the second dose"), &[]);
        assert_eq!(result.rule, PriorityRule::ModerateSymptoms);
        assert_eq!(result.priority, CasePriority::Medium);

        let result = classify_case(&non_serious("Felt Dizzy on standing"), &[]);
        assert_eq!(result.rule, PriorityRule::ModerateSymptoms);
    }

    #[test]
    fn test_missing_count_rule_fires_before_symptom_rule() {
        let missing = MissingField::ALL[..4].to_vec();
        let result = classify_case(&non_serious("dizzy"), &missing);
        assert_eq!(result.rule, PriorityRule::ExcessiveMissingData);
    }

    #[test]
    fn test_absent_description_falls_through_to_low() {
        let report = PartialReport::default();
        let result = classify_case(&report, &[]);
        assert_eq!(result.priority, CasePriority::Low);
        assert_eq!(
            result.reason,
            "Non-serious event with minimal clinical impact reported."
        );
    }
}
