//! In-memory job store.
//!
//! All records live in a single `RwLock<HashMap>`; the store is meant to be
//! wrapped in `Arc` and shared by the submission handler, the background
//! processors and status queries. A restart discards every job.

use std::collections::HashMap;
use std::time::Duration;

use coursecraft_core::error::CoreError;
use coursecraft_core::job::{JobRecord, JobStatus};
use coursecraft_core::types::Timestamp;
use tokio::sync::RwLock;

/// Result of [`JobStore::update_if_processing`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The mutation was applied; carries the record after the write.
    Applied(JobRecord),
    /// The record was already terminal and was left untouched.
    AlreadyTerminal(JobRecord),
    /// No record with that id.
    NotFound,
}

impl UpdateOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied(_))
    }

    /// The current record, whether or not the write was applied.
    pub fn into_record(self) -> Option<JobRecord> {
        match self {
            UpdateOutcome::Applied(r) | UpdateOutcome::AlreadyTerminal(r) => Some(r),
            UpdateOutcome::NotFound => None,
        }
    }
}

/// Process-wide job table keyed by job id.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. Last writer wins.
    pub async fn set(&self, record: JobRecord) {
        self.jobs.write().await.insert(record.id.clone(), record);
    }

    /// Insert a record only if its id is unused. Hands the record back on
    /// collision so the caller can pick a new id.
    pub async fn insert_new(&self, record: JobRecord) -> Result<(), JobRecord> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&record.id) {
            return Err(record);
        }
        jobs.insert(record.id.clone(), record);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<JobRecord> {
        self.jobs.read().await.get(id).cloned()
    }

    pub async fn has(&self, id: &str) -> bool {
        self.jobs.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Apply `mutate` only while the record is still `processing`.
    ///
    /// This is the only path for progress and terminal writes. The check and
    /// the write happen under one write lock, so two racing terminal writes
    /// can never both succeed.
    pub async fn update_if_processing<F>(&self, id: &str, mutate: F) -> Result<UpdateOutcome, CoreError>
    where
        F: FnOnce(&mut JobRecord) -> Result<(), CoreError>,
    {
        let mut jobs = self.jobs.write().await;
        let Some(record) = jobs.get_mut(id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if record.status != JobStatus::Processing {
            return Ok(UpdateOutcome::AlreadyTerminal(record.clone()));
        }
        mutate(record)?;
        Ok(UpdateOutcome::Applied(record.clone()))
    }

    /// Remove records started more than `retention` before `now`.
    /// Returns how many were removed.
    pub async fn sweep(&self, retention: Duration, now: Timestamp) -> usize {
        let retention = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| now - job.started_at <= retention);
        before - jobs.len()
    }
}
