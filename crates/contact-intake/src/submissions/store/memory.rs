use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{scan_table, ScanFilter, ScanPage, StoreError, SubmissionStore};
use crate::submissions::domain::{Submission, SubmissionKey, SubmissionStatus};

/// Process-local table, used when no store file is configured and by tests.
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    table: Mutex<BTreeMap<SubmissionKey, Submission>>,
}

impl InMemorySubmissionStore {
    pub fn len(&self) -> usize {
        self.lock().map(|table| table.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<SubmissionKey, Submission>>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("submission table lock poisoned".to_string()))
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn create(&self, submission: Submission) -> Result<Submission, StoreError> {
        let mut table = self.lock()?;
        table.insert(submission.key(), submission.clone());
        Ok(submission)
    }

    fn get(&self, key: &SubmissionKey) -> Result<Option<Submission>, StoreError> {
        let table = self.lock()?;
        Ok(table.get(key).cloned())
    }

    fn update_status(
        &self,
        key: &SubmissionKey,
        status: SubmissionStatus,
    ) -> Result<Submission, StoreError> {
        let mut table = self.lock()?;
        let record = table.get_mut(key).ok_or(StoreError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }

    fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
        start_after: Option<&SubmissionKey>,
    ) -> Result<ScanPage, StoreError> {
        let table = self.lock()?;
        Ok(scan_table(&table, filter, limit, start_after))
    }
}
