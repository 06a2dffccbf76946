use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::sync::{Arc, Mutex};

use crate::config::SmtpConfig;

/// MailerError
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Email service not configured")]
    NotConfigured,
    #[error("invalid mail address: {0}")]
    InvalidAddress(String),
    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Mailer
///
/// The outbound email collaborator: password-reset links and contact-form
/// forwarding. Plain-text only. The trait keeps the SMTP transport swappable
/// for the mock used in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}

/// MailerState
///
/// The concrete type used to share the mail service across the application state.
pub type MailerState = Arc<dyn Mailer>;

// 1. The Real Implementation (SMTP relay)

/// SmtpMailer
///
/// Async SMTP transport over TLS, authenticated with the configured
/// credentials. One transport instance is shared for the process lifetime;
/// lettre pools connections internally.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|_| MailerError::InvalidAddress(config.from.clone()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|_| MailerError::InvalidAddress(to.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailerError::Transport(e.to_string()))
    }
}

// 2. The Unconfigured Placeholder

/// UnconfiguredMailer
///
/// Installed when no SMTP credentials are present. Every send reports the
/// service as unconfigured; startup is never blocked on mail settings.
pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), MailerError> {
        Err(MailerError::NotConfigured)
    }
}

// 3. The Mock Implementation (For Tests)

/// SentMail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// MockMailer
///
/// Records every message instead of delivering it, so tests can assert on
/// recipients and contents. Can simulate delivery failure.
#[derive(Default)]
pub struct MockMailer {
    pub should_fail: bool,
    pub sent: Mutex<Vec<SentMail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        if self.should_fail {
            return Err(MailerError::Transport(
                "Mock Mailer Error: simulation requested".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
