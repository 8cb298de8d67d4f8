//! Case board workflow over a seeded store.

use chrono::NaiveDate;
use pvtriage_core::{
    parse_batch_yaml, CaseFilter, CasePriority, CaseStatus, CaseStore, FollowUpRecipient,
    PartialReport, StoreError,
};

const SEEDS: &str = r#"
- id: AE-2024-001
  reporter_type: Doctor
  patient_age: 62
  gender: Male
  drug_name: CardioFix
  dose: 10mg daily
  event_description: Sudden anaphylaxis 15 minutes after ingestion. Admitted to ER.
  seriousness: Serious
  hospitalized: true
  event_start_date: "2024-05-10"
  outcome: Recovering
- id: AE-2024-002
  reporter_type: Patient
  drug_name: MigraStop
  event_description: Very nauseous after taking the blue pill, twice now.
  seriousness: Non-Serious
  hospitalized: false
- id: AE-2024-003
  reporter_type: Pharmacist
  patient_age: 45
  gender: Female
  drug_name: InsuLin-X
  dose: 20 Units
  event_description: Hypoglycemia episode, found disoriented by family.
  seriousness: Serious
  hospitalized: false
  event_start_date: "2024-05-12"
  outcome: Recovered
  status: In Progress
"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
}

fn seeded() -> CaseStore {
    CaseStore::seeded(parse_batch_yaml(SEEDS).unwrap(), today()).unwrap()
}

#[test]
fn seeded_board_statistics() {
    let store = seeded();
    let stats = store.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.high_priority_open, 2);
    assert_eq!(stats.new, 2);
    assert_eq!(stats.pending_follow_up, 0);
    assert_eq!(stats.closed, 0);

    let sparse = store.get("AE-2024-002").unwrap();
    assert_eq!(sparse.missing_fields.len(), 5);
    assert_eq!(sparse.priority, CasePriority::Medium);
    assert_eq!(sparse.followup_recipient, FollowUpRecipient::Both);
}

#[test]
fn intake_adds_newest_case_first() {
    let mut store = seeded();
    let id = store
        .ingest(
            PartialReport {
                drug_name: Some("VitaBoost".to_string()),
                ..Default::default()
            },
            today(),
        )
        .unwrap()
        .id
        .clone();
    assert_eq!(id, "AE-2024-004");
    assert_eq!(store.list(CaseFilter::All)[0].id, id);
}

#[test]
fn closing_high_priority_case_reduces_open_count() {
    let mut store = seeded();
    store
        .update_status("AE-2024-001", CaseStatus::Closed)
        .unwrap();
    assert_eq!(store.stats().high_priority_open, 1);
    assert_eq!(store.list(CaseFilter::HighPriority).len(), 2);
}

#[test]
fn duplicate_seed_ids_fail() {
    let seeds = parse_batch_yaml("- id: AE-1\n- id: AE-1\n").unwrap();
    let err = CaseStore::seeded(seeds, today()).unwrap_err();
    assert_eq!(err, StoreError::DuplicateId("AE-1".to_string()));
}
