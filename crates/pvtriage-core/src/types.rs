//! Shared types for adverse-event triage.
//!
//! Enum wire labels match the labels safety reviewers see on screen
//! (`"Non-Serious"`, `"Pending Follow-up"`, ...), so intake documents and
//! serialized case records use the same vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Error returned when a label does not name any variant of a triage enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised {kind} label: '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lowercase a label and collapse separators so `"Non-Serious"`,
/// `"non serious"` and `"NON_SERIOUS"` compare equal.
fn normalize_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Who submitted the original report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReporterType {
    Patient,
    Doctor,
    Pharmacist,
    Consumer,
}

impl ReporterType {
    pub fn label(&self) -> &'static str {
        match self {
            ReporterType::Patient => "Patient",
            ReporterType::Doctor => "Doctor",
            ReporterType::Pharmacist => "Pharmacist",
            ReporterType::Consumer => "Consumer",
        }
    }
}

impl fmt::Display for ReporterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReporterType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "patient" => Ok(ReporterType::Patient),
            "doctor" | "physician" | "hcp" | "clinician" => Ok(ReporterType::Doctor),
            "pharmacist" => Ok(ReporterType::Pharmacist),
            "consumer" => Ok(ReporterType::Consumer),
            _ => Err(ParseLabelError::new("reporter type", s)),
        }
    }
}

/// Binary clinical seriousness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seriousness {
    Serious,
    #[serde(rename = "Non-Serious")]
    NonSerious,
}

impl Seriousness {
    pub fn label(&self) -> &'static str {
        match self {
            Seriousness::Serious => "Serious",
            Seriousness::NonSerious => "Non-Serious",
        }
    }
}

impl fmt::Display for Seriousness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Seriousness {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "serious" => Ok(Seriousness::Serious),
            "non serious" | "nonserious" | "not serious" => Ok(Seriousness::NonSerious),
            _ => Err(ParseLabelError::new("seriousness", s)),
        }
    }
}

/// Clinical outcome of the event at the time of reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Recovered,
    Recovering,
    #[serde(rename = "Not Recovered")]
    NotRecovered,
    Fatal,
    Unknown,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Recovered => "Recovered",
            Outcome::Recovering => "Recovering",
            Outcome::NotRecovered => "Not Recovered",
            Outcome::Fatal => "Fatal",
            Outcome::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "recovered" | "resolved" | "recovered / resolved" => Ok(Outcome::Recovered),
            "recovering" | "resolving" | "recovering / resolving" => Ok(Outcome::Recovering),
            "not recovered" | "not resolved" | "not recovered / not resolved" => {
                Ok(Outcome::NotRecovered)
            }
            "fatal" | "death" | "died" => Ok(Outcome::Fatal),
            "unknown" => Ok(Outcome::Unknown),
            _ => Err(ParseLabelError::new("outcome", s)),
        }
    }
}

/// Workflow position of a case. Transitions are chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Pending Follow-up")]
    PendingFollowUp,
    Closed,
}

impl CaseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::New => "New",
            CaseStatus::InProgress => "In Progress",
            CaseStatus::PendingFollowUp => "Pending Follow-up",
            CaseStatus::Closed => "Closed",
        }
    }

    /// Closed cases are attested as fully reconciled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CaseStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "new" => Ok(CaseStatus::New),
            "in progress" => Ok(CaseStatus::InProgress),
            "pending follow up" | "pending followup" | "pending" => Ok(CaseStatus::PendingFollowUp),
            "closed" => Ok(CaseStatus::Closed),
            _ => Err(ParseLabelError::new("case status", s)),
        }
    }
}

/// Case priority assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CasePriority {
    High,
    Medium,
    Low,
}

impl CasePriority {
    pub fn label(&self) -> &'static str {
        match self {
            CasePriority::High => "High",
            CasePriority::Medium => "Medium",
            CasePriority::Low => "Low",
        }
    }
}

impl fmt::Display for CasePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CasePriority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "high" => Ok(CasePriority::High),
            "medium" => Ok(CasePriority::Medium),
            "low" => Ok(CasePriority::Low),
            _ => Err(ParseLabelError::new("priority", s)),
        }
    }
}

/// Party that should receive a data-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FollowUpRecipient {
    Patient,
    Doctor,
    Both,
    None,
}

impl FollowUpRecipient {
    pub fn label(&self) -> &'static str {
        match self {
            FollowUpRecipient::Patient => "Patient",
            FollowUpRecipient::Doctor => "Doctor",
            FollowUpRecipient::Both => "Both",
            FollowUpRecipient::None => "None",
        }
    }

    pub fn includes_patient(&self) -> bool {
        matches!(self, FollowUpRecipient::Patient | FollowUpRecipient::Both)
    }

    pub fn includes_doctor(&self) -> bool {
        matches!(self, FollowUpRecipient::Doctor | FollowUpRecipient::Both)
    }
}

impl fmt::Display for FollowUpRecipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Labels for safety-relevant fields that can be reported missing.
///
/// The checker only ever emits the first six. `MedicalHistory`,
/// `Seriousness` and `HospitalizationDetails` are consulted by the
/// follow-up router and can only arrive from a caller-supplied list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MissingField {
    #[serde(rename = "Patient Age")]
    PatientAge,
    #[serde(rename = "Gender")]
    Gender,
    #[serde(rename = "Drug Dosage")]
    DrugDosage,
    #[serde(rename = "Event Start Date")]
    EventStartDate,
    #[serde(rename = "Event Outcome")]
    EventOutcome,
    #[serde(rename = "Detailed Description")]
    DetailedDescription,
    #[serde(rename = "Medical History")]
    MedicalHistory,
    #[serde(rename = "Seriousness")]
    Seriousness,
    #[serde(rename = "Hospitalization Details")]
    HospitalizationDetails,
}

impl MissingField {
    pub const ALL: [MissingField; 9] = [
        MissingField::PatientAge,
        MissingField::Gender,
        MissingField::DrugDosage,
        MissingField::EventStartDate,
        MissingField::EventOutcome,
        MissingField::DetailedDescription,
        MissingField::MedicalHistory,
        MissingField::Seriousness,
        MissingField::HospitalizationDetails,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MissingField::PatientAge => "Patient Age",
            MissingField::Gender => "Gender",
            MissingField::DrugDosage => "Drug Dosage",
            MissingField::EventStartDate => "Event Start Date",
            MissingField::EventOutcome => "Event Outcome",
            MissingField::DetailedDescription => "Detailed Description",
            MissingField::MedicalHistory => "Medical History",
            MissingField::Seriousness => "Seriousness",
            MissingField::HospitalizationDetails => "Hospitalization Details",
        }
    }

    /// Resolve an exact label. Labels are compared verbatim.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.label() == label)
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A possibly-incomplete report, as entered manually or returned by extraction.
///
/// Every field is optional. This is both the input to the decision
/// functions and the patch format for field updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "dateReceived", skip_serializing_if = "Option::is_none")]
    pub date_received: Option<NaiveDate>,
    #[serde(
        deserialize_with = "blank_label_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub reporter_type: Option<ReporterType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
    #[serde(
        deserialize_with = "blank_label_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub seriousness: Option<Seriousness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospitalized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_start_date: Option<String>,
    #[serde(
        deserialize_with = "blank_label_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub outcome: Option<Outcome>,
    #[serde(
        deserialize_with = "blank_label_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<CaseStatus>,
}

/// An enum label or any other string, so `""` can be told apart from a typo.
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelOrText<T> {
    Label(T),
    Text(String),
}

/// Deserialize an optional enum label, reading `""` as unset.
fn blank_label_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<LabelOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LabelOrText::Label(value)) => Ok(Some(value)),
        Some(LabelOrText::Text(text)) if text.is_empty() => Ok(None),
        Some(LabelOrText::Text(text)) => Err(D::Error::custom(format!(
            "unrecognised label '{text}'"
        ))),
    }
}

impl PartialReport {
    /// True when the patch carries no values at all.
    pub fn is_empty(&self) -> bool {
        *self == PartialReport::default()
    }
}

/// An assembled adverse-event case with its derived workflow fields.
///
/// `missing_fields`, `priority` and `followup_recipient` are only ever
/// written by [`AdverseEventReport::recompute`](crate::case).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdverseEventReport {
    pub id: String,
    #[serde(alias = "dateReceived")]
    pub date_received: NaiveDate,
    pub reporter_type: ReporterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub drug_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    pub event_description: String,
    pub seriousness: Seriousness,
    pub hospitalized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub followup_recipient: FollowUpRecipient,
    pub missing_fields: Vec<MissingField>,
}

/// Read-only view of the clinical facts the decision functions inspect.
///
/// Implemented by both [`PartialReport`] and [`AdverseEventReport`] so the
/// same rules run at intake and on re-evaluation.
pub trait ClinicalFacts {
    fn reporter_type(&self) -> Option<ReporterType>;
    fn patient_age(&self) -> Option<u32>;
    fn gender(&self) -> Option<&str>;
    fn dose(&self) -> Option<&str>;
    fn event_description(&self) -> Option<&str>;
    fn seriousness(&self) -> Option<Seriousness>;
    fn hospitalized(&self) -> bool;
    fn event_start_date(&self) -> Option<&str>;
    fn outcome(&self) -> Option<Outcome>;
}

impl ClinicalFacts for PartialReport {
    fn reporter_type(&self) -> Option<ReporterType> {
        self.reporter_type
    }

    fn patient_age(&self) -> Option<u32> {
        self.patient_age
    }

    fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    fn dose(&self) -> Option<&str> {
        self.dose.as_deref()
    }

    fn event_description(&self) -> Option<&str> {
        self.event_description.as_deref()
    }

    fn seriousness(&self) -> Option<Seriousness> {
        self.seriousness
    }

    fn hospitalized(&self) -> bool {
        self.hospitalized.unwrap_or(false)
    }

    fn event_start_date(&self) -> Option<&str> {
        self.event_start_date.as_deref()
    }

    fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}

impl ClinicalFacts for AdverseEventReport {
    fn reporter_type(&self) -> Option<ReporterType> {
        Some(self.reporter_type)
    }

    fn patient_age(&self) -> Option<u32> {
        self.patient_age
    }

    fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    fn dose(&self) -> Option<&str> {
        self.dose.as_deref()
    }

    fn event_description(&self) -> Option<&str> {
        Some(self.event_description.as_str())
    }

    fn seriousness(&self) -> Option<Seriousness> {
        Some(self.seriousness)
    }

    fn hospitalized(&self) -> bool {
        self.hospitalized
    }

    fn event_start_date(&self) -> Option<&str> {
        self.event_start_date.as_deref()
    }

    fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}
