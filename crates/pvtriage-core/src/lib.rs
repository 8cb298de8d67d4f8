//! # pvtriage-core
//!
//! Deterministic triage engine for pharmacovigilance adverse-event reports.
//!
//! Every report passes through three decision functions, always in this
//! order:
//! - **Completeness**: which safety-relevant fields are missing?
//! - **Priority**: how urgently must a reviewer look at it?
//! - **Routing**: who should be asked for the missing information?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same report, same missing list, priority and recipient
//! 2. **No LLM calls**: extraction lives in `pvtriage-runtime`; nothing it
//!    suggests overrides the rules here
//! 3. **Safety first**: a hospitalized or serious case is always High
//! 4. **Traceable**: every priority carries the fixed rationale of its rule
//!
//! ## Example
//!
//! ```rust,ignore
//! use pvtriage_core::{CaseFilter, CaseStore, PartialReport};
//!
//! let report = PartialReport::from_yaml_file("report.yaml")?;
//! let mut store = CaseStore::new();
//! let case = store.ingest(report, today)?;
//!
//! println!("{} -> {} ({})", case.id, case.priority, case.followup_recipient);
//! for case in store.list(CaseFilter::HighPriority) {
//!     println!("urgent: {}", case.id);
//! }
//! ```

pub mod case;
pub mod completeness;
pub mod intake;
pub mod outreach;
pub mod patterns;
pub mod priority;
pub mod routing;
pub mod store;
pub mod types;

// Re-export main types at crate root
pub use case::{triage, Triage, UNIDENTIFIED_DRUG};
pub use completeness::detect_missing_fields;
pub use intake::{parse_batch_json, parse_batch_yaml, IntakeError};
pub use outreach::{letters_for, safety_checklist, ChecklistItem, FollowUpForm, FollowUpLetter};
pub use priority::{classify_case, Classification, PriorityRule};
pub use routing::decide_followup_recipient;
pub use store::{CaseFilter, CaseStats, CaseStore, StoreError};
pub use types::{
    AdverseEventReport, CasePriority, CaseStatus, ClinicalFacts, FollowUpRecipient, MissingField,
    Outcome, ParseLabelError, PartialReport, ReporterType, Seriousness,
};
