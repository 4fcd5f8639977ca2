use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for stored submissions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite `(id, timestamp)` key. Ordering is the table's scan order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmissionKey {
    pub id: SubmissionId,
    pub timestamp: String,
}

impl SubmissionKey {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: SubmissionId(id.into()),
            timestamp: timestamp.into(),
        }
    }
}

/// Review state an administrator assigns to a submission. Any value may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    New,
    Viewed,
    Responded,
    Completed,
    Spam,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 5] = [
        SubmissionStatus::New,
        SubmissionStatus::Viewed,
        SubmissionStatus::Responded,
        SubmissionStatus::Completed,
        SubmissionStatus::Spam,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Viewed => "viewed",
            SubmissionStatus::Responded => "responded",
            SubmissionStatus::Completed => "completed",
            SubmissionStatus::Spam => "spam",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown submission status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for SubmissionStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// Raw contact-form payload as posted by the public form. Every field is attacker-controlled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Transport-supplied details about the submitting client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A stored contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub timestamp: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    pub message: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
}

impl Submission {
    /// Builds a fresh record from an already validated form, assigning its key.
    pub fn from_validated(form: ContactForm, metadata: RequestMetadata) -> Self {
        Self {
            id: SubmissionId::generate(),
            timestamp: current_timestamp(),
            name: form.name.unwrap_or_default(),
            email: form.email.unwrap_or_default(),
            phone: form.phone.unwrap_or_default(),
            company: form.company.unwrap_or_default(),
            message: form.message.unwrap_or_default(),
            status: SubmissionStatus::New,
            ip_address: metadata.ip_address.unwrap_or_default(),
            user_agent: metadata.user_agent.unwrap_or_default(),
        }
    }

    pub fn key(&self) -> SubmissionKey {
        SubmissionKey {
            id: self.id.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-03-01T09:30:00.000Z`.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
