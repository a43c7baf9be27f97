//! Submission notifications over SMTP

use anyhow::{Context, Result};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use super::Submission;
use crate::config::{MailConfig, MailCredentials};

/// Announces a new submission.
///
/// `dispatch` returns immediately. Delivery happens in the background and
/// failures are only logged.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, submission: &Submission);
}

/// Plain-text body of the notification email
pub fn compose_body(submission: &Submission) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    format!(
        "Name: {} {}\nEmail: {}\nProject Type: {}\nMessage: {}\n",
        field(&submission.first_name),
        field(&submission.last_name),
        field(&submission.email),
        field(&submission.project_type),
        field(&submission.message),
    )
}

/// Sends through an SMTP relay with implicit TLS
pub struct SmtpNotifier {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    to: Mailbox,
    subject: String,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig, credentials: MailCredentials) -> Result<Self> {
        let from: Mailbox = credentials
            .user
            .parse()
            .with_context(|| format!("Mail user {:?} is not an email address", credentials.user))?;
        let to: Mailbox = match &config.receiver {
            Some(receiver) => receiver
                .parse()
                .with_context(|| format!("Mail receiver {:?} is not an email address", receiver))?,
            None => from.clone(),
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .with_context(|| format!("Invalid SMTP relay {:?}", config.host))?
            .port(config.port)
            .credentials(Credentials::new(credentials.user, credentials.password))
            .build();

        Ok(Self {
            transport: Arc::new(transport),
            from,
            to,
            subject: config.subject.clone(),
        })
    }

    /// Build the notification message for a submission
    pub fn compose(&self, submission: &Submission) -> Result<Message, lettre::error::Error> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(compose_body(submission))
    }
}

impl Notifier for SmtpNotifier {
    fn dispatch(&self, submission: &Submission) {
        let message = match self.compose(submission) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to compose notification email: {}", e);
                return;
            }
        };

        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(_) => tracing::info!("Notification email sent"),
                Err(e) => tracing::error!("Failed to send email: {}", e),
            }
        });
    }
}

/// Used when no mail credentials are configured
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn dispatch(&self, _submission: &Submission) {
        tracing::warn!("Mail credentials not configured, skipping notification email");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> MailCredentials {
        MailCredentials {
            user: "studio@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    fn submission() -> Submission {
        Submission {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            project_type: Some("Website".to_string()),
            message: Some("Let's talk.".to_string()),
        }
    }

    #[test]
    fn test_compose_body() {
        let body = compose_body(&submission());
        assert_eq!(
            body,
            "Name: Ada Lovelace\nEmail: ada@example.com\nProject Type: Website\nMessage: Let's talk.\n"
        );
    }

    #[test]
    fn test_compose_body_missing_fields() {
        let body = compose_body(&Submission::default());
        assert!(body.starts_with("Name:  \nEmail: \n"));
    }

    #[tokio::test]
    async fn test_message_headers() {
        let notifier = SmtpNotifier::new(&MailConfig::default(), credentials()).unwrap();
        let message = notifier.compose(&submission()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("From: studio@example.com"));
        assert!(formatted.contains("To: studio@example.com"));
        assert!(formatted.contains("Subject: "));
        assert!(formatted.contains("Project Type: Website"));
    }

    #[tokio::test]
    async fn test_receiver_override() {
        let config = MailConfig {
            receiver: Some("inbox@example.com".to_string()),
            ..Default::default()
        };
        let notifier = SmtpNotifier::new(&config, credentials()).unwrap();
        let formatted = String::from_utf8(notifier.compose(&submission()).unwrap().formatted()).unwrap();
        assert!(formatted.contains("To: inbox@example.com"));
    }

    #[tokio::test]
    async fn test_rejects_bad_sender() {
        let bad = MailCredentials {
            user: "not an address".to_string(),
            password: "x".to_string(),
        };
        assert!(SmtpNotifier::new(&MailConfig::default(), bad).is_err());
    }
}
