//! Text and JSON views for CLI output.

use chrono::NaiveDate;
use serde::Serialize;

use pvtriage_core::{
    safety_checklist, AdverseEventReport, CaseFilter, CasePriority, CaseStats, CaseStatus,
    CaseStore, ChecklistItem, Classification, FollowUpForm, FollowUpLetter, FollowUpRecipient,
    MissingField, ReporterType,
};
use pvtriage_runtime::{AdvisoryAssessment, AdvisoryDisagreement, IntakeOutcome};

/// One case with its rationale and follow-up plan.
#[derive(Debug, Serialize)]
pub struct CaseView {
    pub record: AdverseEventReport,
    pub rationale: Classification,
    pub checklist: Vec<ChecklistItem>,
    pub initial_form: Option<FollowUpForm>,
    pub outstanding: Vec<MissingField>,
}

impl CaseView {
    pub fn new(record: &AdverseEventReport) -> Self {
        let initial_form = FollowUpForm::initial(record.followup_recipient);
        Self {
            rationale: record.classification(),
            checklist: safety_checklist(record),
            outstanding: initial_form
                .map(|form| form.outstanding(record))
                .unwrap_or_default(),
            initial_form,
            record: record.clone(),
        }
    }

    pub fn to_text(&self) -> String {
        let r = &self.record;
        let mut lines = vec![
            format!("Case {}  (received {})", r.id, r.date_received),
            format!("  Reporter:     {}", r.reporter_type),
            format!("  Patient:      {}", patient_summary(r)),
            format!("  Drug:         {}{}", r.drug_name, dose_suffix(r.dose.as_deref())),
            format!("  Event:        {}", or_dash(&r.event_description)),
            format!(
                "  Seriousness:  {}{}",
                r.seriousness,
                if r.hospitalized { " (hospitalized)" } else { "" }
            ),
            format!("  Outcome:      {}", r.outcome.map_or("-".to_string(), |o| o.to_string())),
            format!("  Status:       {}", r.status),
            String::new(),
            format!("Priority: {}", r.priority),
            format!("  {}", self.rationale.reason),
            format!("Missing fields: {}", field_list(&r.missing_fields)),
            format!("Follow-up: {}", r.followup_recipient),
        ];

        if let Some(form) = self.initial_form {
            lines.push(format!(
                "  Open the {} form; it covers: {}",
                form_name(form),
                field_list(&self.outstanding)
            ));
        }

        lines.push(String::new());
        lines.push("Safety checklist:".to_string());
        for item in &self.checklist {
            let mark = if item.satisfied { "x" } else { " " };
            lines.push(format!("  [{}] {}", mark, item.label));
        }
        lines.join("\n")
    }
}

/// A free-text intake result.
#[derive(Debug, Serialize)]
pub struct ExtractView {
    #[serde(flatten)]
    pub case: CaseView,
    pub advisory: AdvisoryAssessment,
    pub disagreements: Vec<AdvisoryDisagreement>,
}

impl ExtractView {
    pub fn new(outcome: IntakeOutcome) -> Self {
        let disagreements = outcome.advisory_disagreements();
        Self {
            case: CaseView::new(&outcome.record),
            advisory: outcome.advisory,
            disagreements,
        }
    }

    pub fn to_text(&self) -> String {
        let mut text = self.case.to_text();
        text.push_str("\n\nModel assessment (advisory, not used for triage):");
        if let Some(priority) = &self.advisory.priority {
            text.push_str(&format!("\n  Priority: {}", priority));
        }
        if let Some(reasoning) = &self.advisory.reasoning {
            text.push_str(&format!("\n  Reasoning: {}", reasoning));
        }
        for disagreement in &self.disagreements {
            let line = match disagreement {
                AdvisoryDisagreement::Priority { advised, derived } => {
                    format!("model said {}, rules derived {}", advised, derived)
                }
                AdvisoryDisagreement::MissingFields {
                    advised_only,
                    derived_only,
                } => format!(
                    "missing-field lists differ (model only: {}; rules only: {})",
                    if advised_only.is_empty() {
                        "none".to_string()
                    } else {
                        advised_only.join(", ")
                    },
                    field_list(derived_only)
                ),
            };
            text.push_str(&format!("\n  ! {}", line));
        }
        text
    }
}

/// One row of the case board.
#[derive(Debug, Serialize)]
pub struct BoardRow {
    pub id: String,
    pub date_received: NaiveDate,
    pub drug_name: String,
    pub reporter_type: ReporterType,
    pub priority: CasePriority,
    pub status: CaseStatus,
    pub followup_recipient: FollowUpRecipient,
    pub missing: usize,
}

/// Case board: headline stats plus the filtered case list.
#[derive(Debug, Serialize)]
pub struct CaseBoard {
    pub stats: CaseStats,
    pub cases: Vec<BoardRow>,
}

impl CaseBoard {
    pub fn new(store: &CaseStore, filter: CaseFilter) -> Self {
        let cases = store
            .list(filter)
            .into_iter()
            .map(|r| BoardRow {
                id: r.id.clone(),
                date_received: r.date_received,
                drug_name: r.drug_name.clone(),
                reporter_type: r.reporter_type,
                priority: r.priority,
                status: r.status,
                followup_recipient: r.followup_recipient,
                missing: r.missing_fields.len(),
            })
            .collect();
        Self {
            stats: store.stats(),
            cases,
        }
    }

    pub fn to_text(&self) -> String {
        let s = &self.stats;
        let mut lines = vec![
            format!(
                "Total {}  |  High priority open {}  |  New {}  |  Pending follow-up {}  |  Closed {}",
                s.total, s.high_priority_open, s.new, s.pending_follow_up, s.closed
            ),
            String::new(),
            format!(
                "{:<12} {:<10} {:<12} {:<10} {:<8} {:<18} {:<9} {}",
                "ID", "RECEIVED", "DRUG", "REPORTER", "PRIORITY", "STATUS", "FOLLOW-UP", "MISSING"
            ),
        ];
        for row in &self.cases {
            lines.push(format!(
                "{:<12} {:<10} {:<12} {:<10} {:<8} {:<18} {:<9} {}",
                row.id,
                row.date_received.to_string(),
                row.drug_name,
                row.reporter_type.to_string(),
                row.priority.to_string(),
                row.status.to_string(),
                row.followup_recipient.to_string(),
                row.missing
            ));
        }
        if self.cases.is_empty() {
            lines.push("(no cases)".to_string());
        }
        lines.join("\n")
    }
}

pub fn letters_text(record: &AdverseEventReport, letters: &[FollowUpLetter]) -> String {
    if letters.is_empty() {
        return format!("No follow-up required for case {}.", record.id);
    }
    letters
        .iter()
        .map(|letter| {
            format!(
                "To: {}\nSubject: {}\n\n{}",
                form_name(letter.recipient),
                letter.subject,
                letter.body
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n----------------------------------------\n\n")
}

fn form_name(form: FollowUpForm) -> &'static str {
    match form {
        FollowUpForm::Patient => "Patient",
        FollowUpForm::Doctor => "Doctor",
    }
}

fn patient_summary(r: &AdverseEventReport) -> String {
    let age = r.patient_age.map(|a| format!("{} y", a));
    match (age, r.gender.as_deref()) {
        (Some(age), Some(gender)) => format!("{}, {}", age, gender),
        (Some(age), None) => age,
        (None, Some(gender)) => gender.to_string(),
        (None, None) => "-".to_string(),
    }
}

fn dose_suffix(dose: Option<&str>) -> String {
    dose.filter(|d| !d.is_empty())
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

fn field_list(fields: &[MissingField]) -> String {
    if fields.is_empty() {
        return "none".to_string();
    }
    fields
        .iter()
        .map(MissingField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvtriage_core::PartialReport;

    fn record(partial: PartialReport) -> AdverseEventReport {
        let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        AdverseEventReport::assemble(partial, "AE-2024-010", date)
    }

    #[test]
    fn test_case_view_plans_doctor_form_for_both() {
        let view = CaseView::new(&record(PartialReport {
            reporter_type: Some(ReporterType::Patient),
            drug_name: Some("MigraStop".to_string()),
            event_description: Some("Nauseous after the blue pill".to_string()),
            ..Default::default()
        }));

        assert_eq!(view.record.followup_recipient, FollowUpRecipient::Both);
        assert_eq!(view.initial_form, Some(FollowUpForm::Doctor));
        assert_eq!(
            view.outstanding,
            vec![
                MissingField::DrugDosage,
                MissingField::EventStartDate,
                MissingField::EventOutcome
            ]
        );

        let text = view.to_text();
        assert!(text.contains("Case AE-2024-010"));
        assert!(text.contains("Priority: Medium"));
        assert!(text.contains("  [ ] Patient Age"));
    }

    #[test]
    fn test_letters_text_without_follow_up() {
        let complete = record(PartialReport {
            patient_age: Some(40),
            gender: Some("Male".to_string()),
            dose: Some("5mg".to_string()),
            event_start_date: Some("2024-05-01".to_string()),
            outcome: Some(pvtriage_core::Outcome::Recovered),
            event_description: Some("Mild rash on forearm".to_string()),
            ..Default::default()
        });
        assert_eq!(
            letters_text(&complete, &[]),
            "No follow-up required for case AE-2024-010."
        );
    }

    #[test]
    fn test_board_text_lists_rows() {
        let mut store = CaseStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        store
            .ingest(
                PartialReport {
                    hospitalized: Some(true),
                    drug_name: Some("CardioFix".to_string()),
                    ..Default::default()
                },
                date,
            )
            .unwrap();

        let board = CaseBoard::new(&store, CaseFilter::HighPriority);
        assert_eq!(board.cases.len(), 1);
        let text = board.to_text();
        assert!(text.contains("AE-2024-001"));
        assert!(text.contains("High priority open 1"));
    }
}
