use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::domain::{ContactForm, RequestMetadata, Submission};
use super::error::SubmissionError;
use super::notify::{DispatchReport, NotificationDispatcher};
use super::store::SubmissionStore;
use super::validation::validate_form;

/// Result of a successful public submission.
#[derive(Debug)]
pub struct IntakeReceipt {
    pub submission: Submission,
    /// Detached notification task. Dropping the handle does not cancel it.
    pub notification: JoinHandle<DispatchReport>,
}

/// Validate, persist, then notify.
pub struct IntakeFlow<S> {
    store: Arc<S>,
    notifier: Arc<NotificationDispatcher>,
}

impl<S> IntakeFlow<S>
where
    S: SubmissionStore + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<NotificationDispatcher>) -> Self {
        Self { store, notifier }
    }

    /// Must run inside a Tokio runtime; notifications are spawned onto it once the write commits.
    pub fn submit(
        &self,
        mut form: ContactForm,
        metadata: RequestMetadata,
    ) -> Result<IntakeReceipt, SubmissionError> {
        validate_form(&mut form).into_result()?;

        let record = Submission::from_validated(form, metadata);
        let submission = self.store.create(record).map_err(|err| {
            error!(error = %err, "failed to store contact submission");
            SubmissionError::from(err)
        })?;

        info!(
            submission_id = %submission.id,
            timestamp = %submission.timestamp,
            "contact submission stored"
        );

        let notifier = Arc::clone(&self.notifier);
        let stored = submission.clone();
        let notification = tokio::spawn(async move { notifier.dispatch(&stored).await });

        Ok(IntakeReceipt {
            submission,
            notification,
        })
    }
}
