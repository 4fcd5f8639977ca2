use std::sync::Arc;

use super::domain::{ContactForm, RequestMetadata, Submission};
use super::error::SubmissionError;
use super::intake::{IntakeFlow, IntakeReceipt};
use super::notify::NotificationDispatcher;
use super::query::{QueryService, SubmissionPage, SubmissionQuery};
use super::status::{StatusUpdate, StatusUpdater};
use super::store::SubmissionStore;

/// Facade over the intake, query, and status flows sharing one store handle.
pub struct SubmissionService<S> {
    intake: IntakeFlow<S>,
    query: QueryService<S>,
    status: StatusUpdater<S>,
}

impl<S> SubmissionService<S>
where
    S: SubmissionStore + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<NotificationDispatcher>) -> Self {
        Self {
            intake: IntakeFlow::new(Arc::clone(&store), notifier),
            query: QueryService::new(Arc::clone(&store)),
            status: StatusUpdater::new(store),
        }
    }

    /// Public submission path.
    pub fn submit(
        &self,
        form: ContactForm,
        metadata: RequestMetadata,
    ) -> Result<IntakeReceipt, SubmissionError> {
        self.intake.submit(form, metadata)
    }

    pub fn list(&self, query: SubmissionQuery) -> Result<SubmissionPage, SubmissionError> {
        self.query.list(query)
    }

    pub fn update_status(
        &self,
        id: &str,
        timestamp: Option<&str>,
        update: &StatusUpdate,
    ) -> Result<Submission, SubmissionError> {
        self.status.update(id, timestamp, update)
    }
}
