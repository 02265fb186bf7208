// crates/server/src/store.rs
//! In-memory job and record stores.
//!
//! Both stores live for the whole process and are shared behind `Arc` in
//! [`crate::state::AppState`]. Jobs are never deleted once created. Uses
//! `std::sync::RwLock` (not tokio's): no guard is ever held across an
//! `.await` point and reads vastly outnumber writes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::models::{ProviderRecord, Recommendation, ValidationJob};

/// In-memory map of job id to job state.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, ValidationJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly created job. The caller guarantees id uniqueness
    /// (ids come from uuid v4).
    pub fn insert(&self, job: ValidationJob) {
        match self.jobs.write() {
            Ok(mut jobs) => {
                jobs.insert(job.id.clone(), job);
            }
            Err(e) => tracing::error!("RwLock poisoned writing jobs map: {e}"),
        }
    }

    /// Snapshot of a single job, or None if it was never created.
    pub fn get(&self, id: &str) -> Option<ValidationJob> {
        match self.jobs.read() {
            Ok(jobs) => jobs.get(id).cloned(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading jobs map: {e}");
                None
            }
        }
    }

    /// Snapshot of all jobs, in arbitrary order.
    pub fn list(&self) -> Vec<ValidationJob> {
        match self.jobs.read() {
            Ok(jobs) => jobs.values().cloned().collect(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading jobs map: {e}");
                Vec::new()
            }
        }
    }

    /// Mutate a job in place. Only the progression engine owning the job may
    /// call this; there is exactly one engine per job, so writes never race
    /// each other.
    pub(crate) fn update(&self, id: &str, f: impl FnOnce(&mut ValidationJob)) {
        match self.jobs.write() {
            Ok(mut jobs) => {
                if let Some(job) = jobs.get_mut(id) {
                    f(job);
                }
            }
            Err(e) => tracing::error!("RwLock poisoned updating job: {e}"),
        }
    }

    /// Count of jobs in `queued` or `processing` status.
    pub fn count_active(&self) -> usize {
        match self.jobs.read() {
            Ok(jobs) => jobs.values().filter(|j| j.status.is_active()).count(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading jobs map: {e}");
                0
            }
        }
    }
}

/// Aggregate figures over every stored record, for the dashboard.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RecordTotals {
    pub total: usize,
    pub confidence_sum: f64,
    pub manual_review: usize,
}

/// In-memory map of job id to its immutable, pre-generated record sequence.
#[derive(Default)]
pub struct RecordStore {
    records: RwLock<HashMap<String, Arc<Vec<ProviderRecord>>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the full record set for a job. Called exactly once per job,
    /// before its first progression tick.
    pub fn put(&self, job_id: &str, records: Vec<ProviderRecord>) {
        match self.records.write() {
            Ok(mut map) => {
                map.insert(job_id.to_string(), Arc::new(records));
            }
            Err(e) => tracing::error!("RwLock poisoned writing records map: {e}"),
        }
    }

    /// The full record sequence for a job.
    pub fn all(&self, job_id: &str) -> Option<Arc<Vec<ProviderRecord>>> {
        match self.records.read() {
            Ok(map) => map.get(job_id).cloned(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading records map: {e}");
                None
            }
        }
    }

    /// One 1-indexed page of a job's records plus the total count.
    ///
    /// Out-of-range pages clamp to an empty slice rather than erroring; a
    /// missing job behaves like an empty record set (the route layer 404s on
    /// unknown jobs before getting here).
    pub fn page(&self, job_id: &str, page: usize, page_size: usize) -> (Vec<ProviderRecord>, usize) {
        let Some(all) = self.all(job_id) else {
            return (Vec::new(), 0);
        };
        let total = all.len();
        let start = page.saturating_sub(1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);
        (all[start..end].to_vec(), total)
    }

    /// Linear scan for a record by id within one job's set.
    pub fn find(&self, job_id: &str, record_id: &str) -> Option<ProviderRecord> {
        self.all(job_id)?
            .iter()
            .find(|r| r.id == record_id)
            .cloned()
    }

    /// Totals across every job's records, for the dashboard metrics.
    pub fn totals(&self) -> RecordTotals {
        match self.records.read() {
            Ok(map) => {
                let mut totals = RecordTotals::default();
                for records in map.values() {
                    for record in records.iter() {
                        totals.total += 1;
                        totals.confidence_sum += record.overall_confidence;
                        if record.recommendation == Recommendation::ManualReview {
                            totals.manual_review += 1;
                        }
                    }
                }
                totals
            }
            Err(e) => {
                tracing::error!("RwLock poisoned reading records map: {e}");
                RecordTotals::default()
            }
        }
    }
}
