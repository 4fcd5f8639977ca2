//! Persistence for submissions, keyed by the composite `(id, timestamp)` key.
//!
//! The table has no secondary indexes: listing walks the whole key space and filters as it
//! goes, so the cost of a page grows with the size of the table rather than with the number
//! of matches.

mod file;
mod memory;

use std::collections::BTreeMap;
use std::ops::Bound;

pub use file::JsonFileSubmissionStore;
pub use memory::InMemorySubmissionStore;

use super::domain::{Submission, SubmissionKey, SubmissionStatus};

/// Storage abstraction so the intake, query, and status flows can be exercised in isolation.
pub trait SubmissionStore: Send + Sync {
    /// Unconditional insert of a freshly keyed record.
    fn create(&self, submission: Submission) -> Result<Submission, StoreError>;

    fn get(&self, key: &SubmissionKey) -> Result<Option<Submission>, StoreError>;

    /// Sets `status` on an existing record and returns the updated record.
    /// Fails with [`StoreError::NotFound`] rather than creating a record for an unknown key.
    fn update_status(
        &self,
        key: &SubmissionKey,
        status: SubmissionStatus,
    ) -> Result<Submission, StoreError>;

    /// Returns up to `limit` matches in key order, resuming after `start_after`.
    fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
        start_after: Option<&SubmissionKey>,
    ) -> Result<ScanPage, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("submission not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Attribute filters applied while scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    /// Exact status label match.
    pub status: Option<String>,
    /// Inclusive lower bound, compared lexicographically against the ISO-8601 timestamp.
    pub start_date: Option<String>,
    /// Inclusive upper bound, compared lexicographically against the ISO-8601 timestamp.
    pub end_date: Option<String>,
}

impl ScanFilter {
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(status) = &self.status {
            if submission.status.label() != status {
                return false;
            }
        }
        if let Some(start) = &self.start_date {
            if submission.timestamp.as_str() < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if submission.timestamp.as_str() > end.as_str() {
                return false;
            }
        }
        true
    }
}

/// One page of scan results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub items: Vec<Submission>,
    /// Key of the last returned item, present only when another match lies beyond this page.
    pub last_key: Option<SubmissionKey>,
}

pub(crate) fn scan_table(
    table: &BTreeMap<SubmissionKey, Submission>,
    filter: &ScanFilter,
    limit: usize,
    start_after: Option<&SubmissionKey>,
) -> ScanPage {
    let range = match start_after {
        Some(key) => table.range((Bound::Excluded(key.clone()), Bound::Unbounded)),
        None => table.range::<SubmissionKey, _>(..),
    };

    let mut matching = range
        .map(|(_, submission)| submission)
        .filter(|submission| filter.matches(submission));
    let items: Vec<Submission> = matching.by_ref().take(limit).cloned().collect();

    let last_key = if !items.is_empty() && items.len() == limit && matching.next().is_some() {
        items.last().map(Submission::key)
    } else {
        None
    };

    ScanPage { items, last_key }
}
