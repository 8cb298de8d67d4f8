//! Property tests for the decision functions.

use proptest::prelude::*;
use pvtriage_core::{
    classify_case, decide_followup_recipient, detect_missing_fields, triage, CasePriority,
    FollowUpRecipient, MissingField, Outcome, PartialReport, PriorityRule, ReporterType,
    Seriousness,
};

fn reporter() -> impl Strategy<Value = Option<ReporterType>> {
    prop_oneof![
        Just(None),
        Just(Some(ReporterType::Patient)),
        Just(Some(ReporterType::Doctor)),
        Just(Some(ReporterType::Pharmacist)),
        Just(Some(ReporterType::Consumer)),
    ]
}

fn outcome() -> impl Strategy<Value = Option<Outcome>> {
    prop_oneof![
        Just(None),
        Just(Some(Outcome::Recovered)),
        Just(Some(Outcome::Recovering)),
        Just(Some(Outcome::NotRecovered)),
        Just(Some(Outcome::Fatal)),
        Just(Some(Outcome::Unknown)),
    ]
}

fn seriousness() -> impl Strategy<Value = Option<Seriousness>> {
    prop_oneof![
        Just(None),
        Just(Some(Seriousness::Serious)),
        Just(Some(Seriousness::NonSerious)),
    ]
}

fn any_report() -> impl Strategy<Value = PartialReport> {
    (
        reporter(),
        proptest::option::of(0u32..120),
        proptest::option::of("[A-Za-z]{0,8}"),
        proptest::option::of("[0-9]{0,3}(mg)?"),
        proptest::option::of("[a-z ]{0,30}"),
        seriousness(),
        proptest::option::of(any::<bool>()),
        proptest::option::of("[0-9-]{0,10}"),
        outcome(),
    )
        .prop_map(
            |(
                reporter_type,
                patient_age,
                gender,
                dose,
                event_description,
                seriousness,
                hospitalized,
                event_start_date,
                outcome,
            )| PartialReport {
                reporter_type,
                patient_age,
                gender,
                dose,
                event_description,
                seriousness,
                hospitalized,
                event_start_date,
                outcome,
                ..Default::default()
            },
        )
}

proptest! {
    /// Output is always a subsequence of the fixed label order.
    #[test]
    fn missing_fields_keep_fixed_order(report in any_report()) {
        let missing = detect_missing_fields(&report);
        let order = &MissingField::ALL[..6];
        let positions: Vec<usize> = missing
            .iter()
            .map(|field| order.iter().position(|o| o == field).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Hospitalization always wins, whatever else is missing.
    #[test]
    fn hospitalized_is_always_high(mut report in any_report()) {
        report.hospitalized = Some(true);
        let missing = detect_missing_fields(&report);
        prop_assert_eq!(classify_case(&report, &missing).priority, CasePriority::High);
    }

    /// Four or more missing fields on a non-serious case is Medium.
    #[test]
    fn excessive_missing_non_serious_is_medium(
        mut report in any_report(),
        count in 4usize..=6,
    ) {
        report.hospitalized = Some(false);
        report.seriousness = Some(Seriousness::NonSerious);
        let missing = MissingField::ALL[..count].to_vec();
        let classification = classify_case(&report, &missing);
        prop_assert_eq!(classification.priority, CasePriority::Medium);
        prop_assert_eq!(classification.rule, PriorityRule::ExcessiveMissingData);
    }

    /// A short description with no other facts reports all six checker labels.
    #[test]
    fn short_description_alone_misses_everything(description in "[a-z]{0,9}") {
        let report = PartialReport {
            event_description: Some(description),
            ..Default::default()
        };
        prop_assert_eq!(detect_missing_fields(&report), MissingField::ALL[..6].to_vec());
    }

    /// Nothing missing always routes to None.
    #[test]
    fn nothing_missing_routes_to_none(report in any_report()) {
        prop_assert_eq!(decide_followup_recipient(&report, &[]), FollowUpRecipient::None);
    }

    /// Re-running the pipeline on the same input gives the same answer.
    #[test]
    fn triage_is_idempotent(report in any_report()) {
        prop_assert_eq!(triage(&report), triage(&report.clone()));
    }
}
