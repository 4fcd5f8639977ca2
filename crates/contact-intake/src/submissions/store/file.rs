use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use super::{scan_table, ScanFilter, ScanPage, StoreError, SubmissionStore};
use crate::submissions::domain::{Submission, SubmissionKey, SubmissionStatus};

type Table = BTreeMap<SubmissionKey, Submission>;

/// Submission table persisted as a JSON array, rewritten in full after every write.
///
/// Writes go to a sibling temp file first and are renamed into place, so a crash mid-write
/// leaves the previous table intact. A failed flush rolls the in-memory change back and
/// surfaces as a store error.
#[derive(Debug)]
pub struct JsonFileSubmissionStore {
    path: PathBuf,
    table: Mutex<Table>,
}

impl JsonFileSubmissionStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = load_table(&path)?;
        info!(path = %path.display(), submissions = table.len(), "submission store opened");

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("submission table lock poisoned".to_string()))
    }

    fn flush(&self, table: &Table) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let records: Vec<&Submission> = table.values().collect();
        let payload = serde_json::to_vec_pretty(&records)?;

        let staging = self.path.with_extension("json.tmp");
        let mut file = File::create(&staging)?;
        file.write_all(&payload)?;
        file.sync_all()?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), submissions = records.len(), "submission store flushed");
        Ok(())
    }
}

fn load_table(path: &Path) -> Result<Table, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Table::new()),
        Err(err) => return Err(err.into()),
    };

    let records: Vec<Submission> = serde_json::from_reader(BufReader::new(file))?;
    Ok(records
        .into_iter()
        .map(|submission| (submission.key(), submission))
        .collect())
}

impl SubmissionStore for JsonFileSubmissionStore {
    fn create(&self, submission: Submission) -> Result<Submission, StoreError> {
        let mut table = self.lock()?;
        let key = submission.key();
        let previous = table.insert(key.clone(), submission.clone());

        if let Err(err) = self.flush(&table) {
            match previous {
                Some(previous) => table.insert(key, previous),
                None => table.remove(&key),
            };
            return Err(err);
        }

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
        let previous = std::mem::replace(&mut record.status, status);
        let updated = record.clone();

        if let Err(err) = self.flush(&table) {
            if let Some(record) = table.get_mut(key) {
                record.status = previous;
            }
            return Err(err);
        }

        Ok(updated)
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
