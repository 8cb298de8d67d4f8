//! End-to-end triage of reference reports, read through the intake parser.

use chrono::NaiveDate;
use pvtriage_core::{
    triage, AdverseEventReport, CasePriority, CaseStatus, FollowUpRecipient, MissingField,
    PartialReport, PriorityRule,
};

fn received() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
}

#[test]
fn complete_non_serious_report_needs_nothing() {
    let report = PartialReport::from_yaml(
        r#"
hospitalized: false
seriousness: Non-Serious
dose: 10mg
event_start_date: "2024-05-10"
outcome: Recovered
patient_age: 45
gender: Female
event_description: Mild rash.
"#,
    )
    .unwrap();

    let result = triage(&report);
    assert!(result.missing_fields.is_empty());
    assert_eq!(result.classification.priority, CasePriority::Low);
    assert_eq!(result.followup_recipient, FollowUpRecipient::None);
}

#[test]
fn hospitalized_sparse_report_is_high_and_goes_to_both() {
    let report = PartialReport::from_json(
        r#"{ "hospitalized": true, "reporter_type": "Doctor", "event_description": "anaphylaxis" }"#,
    )
    .unwrap();

    // "anaphylaxis" is 11 characters, so the description counts as present.
    let result = triage(&report);
    assert_eq!(result.missing_fields, MissingField::ALL[..5].to_vec());
    assert!(!result
        .missing_fields
        .contains(&MissingField::DetailedDescription));
    assert_eq!(result.classification.priority, CasePriority::High);
    assert_eq!(result.classification.rule, PriorityRule::SeriousOrHospitalized);
    assert_eq!(result.followup_recipient, FollowUpRecipient::Both);
}

#[test]
fn hospitalized_report_with_terse_description_misses_all_six() {
    let report = PartialReport::from_json(
        r#"{ "hospitalized": true, "reporter_type": "Doctor", "event_description": "rash" }"#,
    )
    .unwrap();

    let result = triage(&report);
    assert_eq!(result.missing_fields, MissingField::ALL[..6].to_vec());
    assert_eq!(result.classification.priority, CasePriority::High);
    assert_eq!(result.classification.rule, PriorityRule::SeriousOrHospitalized);
    assert_eq!(result.followup_recipient, FollowUpRecipient::Both);
}

#[test]
fn patient_report_missing_only_outcome_goes_to_doctor() {
    let report = PartialReport::from_yaml(
        r#"
reporter_type: Patient
hospitalized: false
seriousness: Non-Serious
dose: 50mg
event_start_date: "2024-05-01"
event_description: I feel dizzy and unwell
patient_age: 30
gender: Male
"#,
    )
    .unwrap();

    let result = triage(&report);
    assert_eq!(result.missing_fields, vec![MissingField::EventOutcome]);
    assert_eq!(result.classification.priority, CasePriority::Medium);
    assert_eq!(
        result.classification.reason,
        "Symptom severity is moderate and requires investigation."
    );
    assert_eq!(result.followup_recipient, FollowUpRecipient::Doctor);
}

#[test]
fn doctor_report_missing_demographics_goes_to_patient() {
    let report = PartialReport::from_yaml(
        r#"
reporter_type: Doctor
drug_name: Dermacure
dose: 2% cream
event_start_date: "2024-05-14"
outcome: Unknown
event_description: Mild contact dermatitis at application site.
"#,
    )
    .unwrap();

    let result = triage(&report);
    assert_eq!(
        result.missing_fields,
        vec![MissingField::PatientAge, MissingField::Gender]
    );
    assert_eq!(result.followup_recipient, FollowUpRecipient::Patient);
}

#[test]
fn follow_up_then_close_workflow() {
    let partial = PartialReport::from_json(
        r#"{ "reporter_type": "Consumer", "drug_name": "VitaBoost", "dose": "1 tablet",
             "event_description": "Slight headache after use." }"#,
    )
    .unwrap();
    let mut case = AdverseEventReport::assemble(partial, "AE-2024-005", received());
    assert_eq!(case.missing_fields.len(), 4);
    assert_eq!(case.priority, CasePriority::Medium);
    assert_eq!(case.followup_recipient, FollowUpRecipient::Both);

    case.apply(
        PartialReport::from_yaml(
            r#"
patient_age: 52
gender: Female
event_start_date: "2024-05-13"
outcome: Recovered
status: Pending Follow-up
"#,
        )
        .unwrap(),
    );
    assert!(case.missing_fields.is_empty());
    assert_eq!(case.priority, CasePriority::Low);
    assert_eq!(case.status, CaseStatus::PendingFollowUp);

    case.set_status(CaseStatus::Closed);
    assert_eq!(case.followup_recipient, FollowUpRecipient::None);
}
