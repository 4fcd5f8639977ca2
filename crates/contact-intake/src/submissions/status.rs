use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use super::domain::{Submission, SubmissionKey, SubmissionStatus};
use super::error::SubmissionError;
use super::store::SubmissionStore;

/// Body of a status update request. `status` is kept loosely typed so a non-string value is
/// reported as an invalid status rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<Value>,
}

impl StatusUpdate {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: Some(Value::String(status.into())),
        }
    }

    fn requested_status(&self) -> Result<SubmissionStatus, SubmissionError> {
        match &self.status {
            None | Some(Value::Null) => Err(SubmissionError::MissingStatus),
            Some(Value::String(raw)) if raw.is_empty() => Err(SubmissionError::MissingStatus),
            Some(Value::String(raw)) => raw
                .parse()
                .map_err(|_| SubmissionError::InvalidStatus(raw.clone())),
            Some(other) => Err(SubmissionError::InvalidStatus(other.to_string())),
        }
    }
}

/// Applies admin status changes. Every status may follow every other; last write wins.
pub struct StatusUpdater<S> {
    store: Arc<S>,
}

impl<S> StatusUpdater<S>
where
    S: SubmissionStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn update(
        &self,
        id: &str,
        timestamp: Option<&str>,
        update: &StatusUpdate,
    ) -> Result<Submission, SubmissionError> {
        let timestamp = timestamp
            .filter(|value| !value.is_empty())
            .ok_or(SubmissionError::MissingTimestamp)?;
        let status = update.requested_status()?;
        let key = SubmissionKey::new(id, timestamp);

        if self.store.get(&key).map_err(log_store_failure)?.is_none() {
            return Err(SubmissionError::NotFound);
        }

        let updated = self
            .store
            .update_status(&key, status)
            .map_err(log_store_failure)?;

        info!(submission_id = %updated.id, status = %updated.status, "submission status updated");
        Ok(updated)
    }
}

fn log_store_failure(err: super::store::StoreError) -> SubmissionError {
    let err = SubmissionError::from(err);
    if let SubmissionError::Store(inner) = &err {
        error!(error = %inner, "failed to update submission status");
    }
    err
}
