use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Plain-text message handed to a mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail transport unavailable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound e-mail hook. Implementations must be safe to share across requests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailerError>;
}

/// Local/offline transport: records the full message in the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailerError> {
        info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "notification recorded locally, not sent"
        );
        Ok(())
    }
}

/// Transport posting each message as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, token)
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailerError> {
        let mut request = self.client.post(&self.endpoint).json(&email);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailerError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
