//! Contact-form submission lifecycle: intake, storage, notification, listing, and status changes.

pub mod cursor;
pub mod domain;
pub mod error;
pub mod intake;
pub mod notify;
pub mod query;
pub mod router;
pub mod service;
pub mod status;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use cursor::{CursorError, ScanCursor};
pub use domain::{
    ContactForm, RequestMetadata, Submission, SubmissionId, SubmissionKey, SubmissionStatus,
};
pub use error::SubmissionError;
pub use intake::{IntakeFlow, IntakeReceipt};
pub use notify::{
    DispatchReport, HttpMailer, LogMailer, Mailer, MailerError, NotificationDispatcher,
    OutboundEmail,
};
pub use query::{Pagination, QueryService, SubmissionPage, SubmissionQuery};
pub use router::{submission_router, OriginPolicy};
pub use service::SubmissionService;
pub use status::{StatusUpdate, StatusUpdater};
pub use store::{
    InMemorySubmissionStore, JsonFileSubmissionStore, ScanFilter, ScanPage, StoreError,
    SubmissionStore,
};
pub use validation::{sanitize, validate_form, ValidationErrors, ValidationReport};
