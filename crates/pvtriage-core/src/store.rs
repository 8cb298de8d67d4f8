//! Session-owned case store.
//!
//! The store owns the collection of case records for one reviewer session.
//! Every mutation goes through [`AdverseEventReport`] so derived fields are
//! recomputed; the decision functions themselves stay stateless.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::types::{AdverseEventReport, CasePriority, CaseStatus, PartialReport};

/// Errors from case store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("case not found: {0}")]
    NotFound(String),

    #[error("case id already exists: {0}")]
    DuplicateId(String),
}

/// Which cases a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFilter {
    #[default]
    All,
    HighPriority,
}

impl CaseFilter {
    fn matches(&self, record: &AdverseEventReport) -> bool {
        match self {
            CaseFilter::All => true,
            CaseFilter::HighPriority => record.priority == CasePriority::High,
        }
    }
}

/// Headline counters for the case board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CaseStats {
    pub total: usize,
    /// High-priority cases that are not yet closed.
    pub high_priority_open: usize,
    pub new: usize,
    pub pending_follow_up: usize,
    /// Closed cases, reconciled and ready for regulatory filing.
    pub closed: usize,
}

/// In-memory case collection, newest first.
#[derive(Debug, Clone, Default)]
pub struct CaseStore {
    cases: Vec<AdverseEventReport>,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed reports, keeping their order.
    ///
    /// Seeds without a `date_received` use `default_received`.
    pub fn seeded(
        seeds: impl IntoIterator<Item = PartialReport>,
        default_received: NaiveDate,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for seed in seeds {
            let received = seed.date_received.unwrap_or(default_received);
            store.ingest(seed, received)?;
        }
        store.cases.reverse();
        Ok(store)
    }

    /// Assemble a partial report into a case and insert it at the front.
    ///
    /// The report's own id is kept when present; otherwise the next free
    /// `AE-<year>-<seq>` id is assigned.
    pub fn ingest(
        &mut self,
        partial: PartialReport,
        date_received: NaiveDate,
    ) -> Result<&AdverseEventReport, StoreError> {
        let id = match partial.id.clone().filter(|id| !id.is_empty()) {
            Some(id) if self.contains(&id) => return Err(StoreError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_case_id(date_received.year()),
        };

        let record = AdverseEventReport::assemble(partial, id, date_received);
        tracing::info!(
            case_id = %record.id,
            priority = %record.priority,
            recipient = %record.followup_recipient,
            missing = record.missing_fields.len(),
            "case ingested"
        );

        self.cases.insert(0, record);
        Ok(&self.cases[0])
    }

    /// Next unused id of the form `AE-<year>-<seq:03>`.
    pub fn next_case_id(&self, year: i32) -> String {
        let mut sequence = self.cases.len() + 1;
        loop {
            let candidate = format!("AE-{year}-{sequence:03}");
            if !self.contains(&candidate) {
                return candidate;
            }
            sequence += 1;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cases.iter().any(|record| record.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&AdverseEventReport> {
        self.cases.iter().find(|record| record.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut AdverseEventReport, StoreError> {
        self.cases
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Cases matching `filter`, newest first.
    pub fn list(&self, filter: CaseFilter) -> Vec<&AdverseEventReport> {
        self.cases
            .iter()
            .filter(|record| filter.matches(record))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Move a case to `status`. Closing clears its missing-field list.
    pub fn update_status(
        &mut self,
        id: &str,
        status: CaseStatus,
    ) -> Result<&AdverseEventReport, StoreError> {
        let record = self.get_mut(id)?;
        let previous = record.status;
        record.set_status(status);
        tracing::info!(
            case_id = %id,
            from = %previous,
            to = %status,
            "case status updated"
        );
        Ok(record)
    }

    /// Patch clinical fields on a case and recompute its triage.
    pub fn update_fields(
        &mut self,
        id: &str,
        patch: PartialReport,
    ) -> Result<&AdverseEventReport, StoreError> {
        let record = self.get_mut(id)?;
        record.apply(patch);
        tracing::info!(
            case_id = %id,
            priority = %record.priority,
            recipient = %record.followup_recipient,
            missing = record.missing_fields.len(),
            "case re-evaluated"
        );
        Ok(record)
    }

    pub fn stats(&self) -> CaseStats {
        self.cases.iter().fold(
            CaseStats {
                total: self.cases.len(),
                ..Default::default()
            },
            |mut stats, record| {
                if record.priority == CasePriority::High && record.status != CaseStatus::Closed {
                    stats.high_priority_open += 1;
                }
                match record.status {
                    CaseStatus::New => stats.new += 1,
                    CaseStatus::PendingFollowUp => stats.pending_follow_up += 1,
                    CaseStatus::Closed => stats.closed += 1,
                    CaseStatus::InProgress => {}
                }
                stats
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FollowUpRecipient, Outcome, Seriousness};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn serious(id: &str) -> PartialReport {
        PartialReport {
            id: Some(id.to_string()),
            seriousness: Some(Seriousness::Serious),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_assigns_sequential_ids_newest_first() {
        let mut store = CaseStore::new();
        let first = store.ingest(PartialReport::default(), today()).unwrap().id.clone();
        let second = store.ingest(PartialReport::default(), today()).unwrap().id.clone();

        assert_eq!(first, "AE-2024-001");
        assert_eq!(second, "AE-2024-002");

        let ids: Vec<_> = store.list(CaseFilter::All).iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["AE-2024-002", "AE-2024-001"]);
    }

    #[test]
    fn test_generated_ids_skip_existing_ones() {
        let mut store = CaseStore::new();
        store.ingest(serious("AE-2024-002"), today()).unwrap();
        let generated = store.ingest(PartialReport::default(), today()).unwrap();
        assert_eq!(generated.id, "AE-2024-003");
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut store = CaseStore::new();
        store.ingest(serious("AE-2024-001"), today()).unwrap();
        let err = store.ingest(serious("AE-2024-001"), today()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId("AE-2024-001".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_seeded_store_keeps_seed_order() {
        let store = CaseStore::seeded(
            vec![serious("AE-2024-001"), serious("AE-2024-002")],
            today(),
        )
        .unwrap();
        let ids: Vec<_> = store.list(CaseFilter::All).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["AE-2024-001", "AE-2024-002"]);
    }

    #[test]
    fn test_close_clears_missing_fields_and_updates_stats() {
        let mut store = CaseStore::new();
        store.ingest(serious("AE-2024-001"), today()).unwrap();
        assert_eq!(store.stats().high_priority_open, 1);

        let closed = store.update_status("AE-2024-001", CaseStatus::Closed).unwrap();
        assert!(closed.missing_fields.is_empty());
        assert_eq!(closed.followup_recipient, FollowUpRecipient::None);

        let stats = store.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.high_priority_open, 0);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.new, 0);
    }

    #[test]
    fn test_update_fields_recomputes() {
        let mut store = CaseStore::new();
        let id = store
            .ingest(PartialReport::default(), today())
            .unwrap()
            .id
            .clone();

        let updated = store
            .update_fields(
                &id,
                PartialReport {
                    outcome: Some(Outcome::Recovering),
                    hospitalized: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.priority, CasePriority::High);
        assert_eq!(updated.missing_fields.len(), 5);
    }

    #[test]
    fn test_unknown_case_is_not_found() {
        let mut store = CaseStore::new();
        assert_eq!(
            store.update_status("AE-404", CaseStatus::Closed).unwrap_err(),
            StoreError::NotFound("AE-404".to_string())
        );
        assert!(store.get("AE-404").is_none());
    }

    #[test]
    fn test_high_priority_filter() {
        let mut store = CaseStore::new();
        store.ingest(serious("AE-2024-001"), today()).unwrap();
        store
            .ingest(
                PartialReport {
                    id: Some("AE-2024-002".to_string()),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();

        let high = store.list(CaseFilter::HighPriority);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].id, "AE-2024-001");
    }
}
