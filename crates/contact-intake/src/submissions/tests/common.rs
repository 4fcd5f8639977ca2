use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::submissions::domain::{
    ContactForm, Submission, SubmissionId, SubmissionKey, SubmissionStatus,
};
use crate::submissions::notify::{Mailer, MailerError, NotificationDispatcher, OutboundEmail};
use crate::submissions::store::{
    InMemorySubmissionStore, ScanFilter, ScanPage, StoreError, SubmissionStore,
};
use crate::submissions::{submission_router, OriginPolicy, SubmissionService};

pub(super) const ADMIN_EMAIL: &str = "admin@thunk-it.com";
pub(super) const SENDER: &str = "no-reply@thunk-it.com";

#[derive(Default)]
pub(super) struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailerError> {
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(())
    }
}

pub(super) struct RejectingMailer;

#[async_trait]
impl Mailer for RejectingMailer {
    async fn send(&self, _email: OutboundEmail) -> Result<(), MailerError> {
        Err(MailerError::Rejected {
            status: 503,
            body: "relay down".to_string(),
        })
    }
}

pub(super) struct UnavailableStore;

impl SubmissionStore for UnavailableStore {
    fn create(&self, _submission: Submission) -> Result<Submission, StoreError> {
        Err(StoreError::Unavailable("table offline".to_string()))
    }

    fn get(&self, _key: &SubmissionKey) -> Result<Option<Submission>, StoreError> {
        Err(StoreError::Unavailable("table offline".to_string()))
    }

    fn update_status(
        &self,
        _key: &SubmissionKey,
        _status: SubmissionStatus,
    ) -> Result<Submission, StoreError> {
        Err(StoreError::Unavailable("table offline".to_string()))
    }

    fn scan(
        &self,
        _filter: &ScanFilter,
        _limit: usize,
        _start_after: Option<&SubmissionKey>,
    ) -> Result<ScanPage, StoreError> {
        Err(StoreError::Unavailable("table offline".to_string()))
    }
}

/// In-memory table that remembers which threads touched it.
#[derive(Default)]
pub(super) struct ThreadTrackingStore {
    inner: InMemorySubmissionStore,
    threads: Mutex<Vec<ThreadId>>,
}

impl ThreadTrackingStore {
    pub(super) fn threads(&self) -> Vec<ThreadId> {
        self.threads.lock().expect("thread log poisoned").clone()
    }

    fn record(&self) {
        self.threads
            .lock()
            .expect("thread log poisoned")
            .push(std::thread::current().id());
    }
}

impl SubmissionStore for ThreadTrackingStore {
    fn create(&self, submission: Submission) -> Result<Submission, StoreError> {
        self.record();
        self.inner.create(submission)
    }

    fn get(&self, key: &SubmissionKey) -> Result<Option<Submission>, StoreError> {
        self.record();
        self.inner.get(key)
    }

    fn update_status(
        &self,
        key: &SubmissionKey,
        status: SubmissionStatus,
    ) -> Result<Submission, StoreError> {
        self.record();
        self.inner.update_status(key, status)
    }

    fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
        start_after: Option<&SubmissionKey>,
    ) -> Result<ScanPage, StoreError> {
        self.record();
        self.inner.scan(filter, limit, start_after)
    }
}

pub(super) fn dispatcher(mailer: Arc<dyn Mailer>) -> Arc<NotificationDispatcher> {
    Arc::new(NotificationDispatcher::new(
        mailer,
        SENDER,
        Some(ADMIN_EMAIL.to_string()),
    ))
}

pub(super) fn build_service() -> (
    Arc<SubmissionService<InMemorySubmissionStore>>,
    Arc<InMemorySubmissionStore>,
    Arc<RecordingMailer>,
) {
    let store = Arc::new(InMemorySubmissionStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let service = Arc::new(SubmissionService::new(
        Arc::clone(&store),
        dispatcher(mailer.clone()),
    ));
    (service, store, mailer)
}

pub(super) fn unavailable_service() -> Arc<SubmissionService<UnavailableStore>> {
    Arc::new(SubmissionService::new(
        Arc::new(UnavailableStore),
        dispatcher(Arc::new(RecordingMailer::default())),
    ))
}

pub(super) fn contact_form() -> ContactForm {
    ContactForm {
        name: Some("John Doe".to_string()),
        email: Some("john@example.com".to_string()),
        phone: Some("555-0100".to_string()),
        company: None,
        message: Some("I'd like a quote.".to_string()),
    }
}

/// Inserts records with ids `sub-00`, `sub-01`, ... one day apart, all with `status`.
pub(super) fn seed(store: &InMemorySubmissionStore, count: usize, status: SubmissionStatus) {
    for index in 0..count {
        store
            .create(Submission {
                id: SubmissionId(format!("sub-{index:02}")),
                timestamp: format!("2025-02-{:02}T12:00:00.000Z", index + 1),
                name: format!("Visitor {index}"),
                email: format!("visitor{index}@example.com"),
                phone: String::new(),
                company: String::new(),
                message: "Hello".to_string(),
                status,
                ip_address: String::new(),
                user_agent: String::new(),
            })
            .expect("seed insert");
    }
}

pub(super) fn router_with<S: SubmissionStore + 'static>(
    service: Arc<SubmissionService<S>>,
) -> axum::Router {
    submission_router(service, OriginPolicy::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
