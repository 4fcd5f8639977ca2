//! Best-effort e-mail notifications sent after a submission is stored.

mod mailer;

use std::sync::Arc;

use tracing::{info, warn};

pub use mailer::{HttpMailer, LogMailer, Mailer, MailerError, OutboundEmail};

use super::domain::Submission;
use crate::config::{NotificationConfig, NotificationMode};

pub const ADMIN_SUBJECT: &str = "New Contact Form Submission";
pub const ACKNOWLEDGMENT_SUBJECT: &str = "Thank you for contacting us";

const SIGNATURE: &str = "The Thunk-it.com Team";

/// Which of the two notifications a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    AdminSummary,
    Acknowledgment,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::AdminSummary => "admin_summary",
            NotificationKind::Acknowledgment => "acknowledgment",
        }
    }
}

/// Per-notification result of a dispatch, kept for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub admin_sent: bool,
    pub acknowledgment_sent: bool,
}

/// Composes and sends the admin summary and submitter acknowledgment.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    sender: String,
    admin_email: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        sender: impl Into<String>,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            mailer,
            sender: sender.into(),
            admin_email,
        }
    }

    /// Picks the transport once, from the configured mode.
    pub fn from_config(config: &NotificationConfig) -> Self {
        let mailer: Arc<dyn Mailer> = match (config.mode, &config.mail_api_url) {
            (NotificationMode::Deliver, Some(url)) => {
                Arc::new(HttpMailer::new(url.clone(), config.mail_api_token.clone()))
            }
            (NotificationMode::Deliver, None) => {
                warn!("no mail relay configured, notifications will only be logged");
                Arc::new(LogMailer)
            }
            (NotificationMode::Log, _) => Arc::new(LogMailer),
        };

        Self::new(mailer, config.sender.clone(), config.admin_email.clone())
    }

    pub fn compose(&self, submission: &Submission) -> Vec<(NotificationKind, OutboundEmail)> {
        let mut messages = Vec::with_capacity(2);
        if let Some(admin) = &self.admin_email {
            messages.push((
                NotificationKind::AdminSummary,
                OutboundEmail {
                    from: self.sender.clone(),
                    to: admin.clone(),
                    subject: ADMIN_SUBJECT.to_string(),
                    text: admin_summary(submission),
                },
            ));
        }
        messages.push((
            NotificationKind::Acknowledgment,
            OutboundEmail {
                from: self.sender.clone(),
                to: submission.email.clone(),
                subject: ACKNOWLEDGMENT_SUBJECT.to_string(),
                text: acknowledgment(submission),
            },
        ));
        messages
    }

    /// Sends both notifications. Failures are logged and never returned.
    pub async fn dispatch(&self, submission: &Submission) -> DispatchReport {
        let mut report = DispatchReport {
            admin_sent: false,
            acknowledgment_sent: false,
        };

        if self.admin_email.is_none() {
            warn!(
                submission_id = %submission.id,
                "no admin recipient configured, skipping summary"
            );
        }

        for (kind, email) in self.compose(submission) {
            let sent = match self.mailer.send(email).await {
                Ok(()) => {
                    info!(submission_id = %submission.id, kind = kind.label(), "notification sent");
                    true
                }
                Err(err) => {
                    warn!(
                        submission_id = %submission.id,
                        kind = kind.label(),
                        error = %err,
                        "notification failed"
                    );
                    false
                }
            };

            match kind {
                NotificationKind::AdminSummary => report.admin_sent = sent,
                NotificationKind::Acknowledgment => report.acknowledgment_sent = sent,
            }
        }

        report
    }
}

fn or_not_provided(value: &str) -> &str {
    if value.is_empty() {
        "Not provided"
    } else {
        value
    }
}

fn admin_summary(submission: &Submission) -> String {
    format!(
        "New contact form submission:\n\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Company: {}\n\
         Message: {}\n\n\
         Submission ID: {}\n\
         Timestamp: {}\n",
        submission.name,
        submission.email,
        or_not_provided(&submission.phone),
        or_not_provided(&submission.company),
        submission.message,
        submission.id,
        submission.timestamp,
    )
}

fn acknowledgment(submission: &Submission) -> String {
    format!(
        "Dear {},\n\n\
         Thank you for contacting us. We have received your message and will get back to you \
         as soon as possible.\n\n\
         Best regards,\n\
         {SIGNATURE}\n",
        submission.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submissions::domain::{SubmissionId, SubmissionStatus};

    fn submission() -> Submission {
        Submission {
            id: SubmissionId("sub-1".to_string()),
            timestamp: "2025-03-01T09:30:00.000Z".to_string(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            phone: String::new(),
            company: "ACME".to_string(),
            message: "Hello &amp; welcome".to_string(),
            status: SubmissionStatus::New,
            ip_address: String::new(),
            user_agent: String::new(),
        }
    }

    #[test]
    fn composes_admin_summary_and_acknowledgment() {
        let dispatcher = NotificationDispatcher::new(
            Arc::new(LogMailer),
            "no-reply@thunk-it.com",
            Some("admin@thunk-it.com".to_string()),
        );

        let messages = dispatcher.compose(&submission());
        assert_eq!(messages.len(), 2);

        let (kind, admin) = &messages[0];
        assert_eq!(*kind, NotificationKind::AdminSummary);
        assert_eq!(admin.to, "admin@thunk-it.com");
        assert_eq!(admin.from, "no-reply@thunk-it.com");
        assert_eq!(admin.subject, ADMIN_SUBJECT);
        assert!(admin.text.contains("Phone: Not provided"));
        assert!(admin.text.contains("Company: ACME"));
        assert!(admin.text.contains("Submission ID: sub-1"));
        assert!(admin.text.contains("Timestamp: 2025-03-01T09:30:00.000Z"));

        let (kind, ack) = &messages[1];
        assert_eq!(*kind, NotificationKind::Acknowledgment);
        assert_eq!(ack.to, "jane@example.com");
        assert_eq!(ack.subject, ACKNOWLEDGMENT_SUBJECT);
        assert!(ack.text.starts_with("Dear Jane,"));
    }

    #[test]
    fn skips_admin_summary_without_recipient() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(LogMailer), "no-reply@localhost", None);
        let messages = dispatcher.compose(&submission());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, NotificationKind::Acknowledgment);
    }

    #[tokio::test]
    async fn log_mode_reports_both_notifications_sent() {
        let dispatcher = NotificationDispatcher::new(
            Arc::new(LogMailer),
            "no-reply@localhost",
            Some("admin@localhost".to_string()),
        );
        let report = dispatcher.dispatch(&submission()).await;
        assert!(report.admin_sent);
        assert!(report.acknowledgment_sent);
    }
}
