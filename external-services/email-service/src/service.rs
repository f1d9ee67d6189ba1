use chrono::Local;
use logger_redacted::{redact, redacted_info};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::error::{EmailError, EmailResult};
use crate::imap::ImapMailbox;
use crate::inbox::{DropFolderMailbox, InboxEmail, MailboxSource};
use crate::transport::{MailTransport, OutgoingEmail, SmtpTransport};

pub const DEFAULT_FETCH_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub message: String,
    pub sent_at: String,
}

/// Email service for patient correspondence
pub struct EmailService {
    config: EmailConfig,
    transport: Arc<dyn MailTransport>,
    mailbox: Arc<dyn MailboxSource>,
}

impl EmailService {
    /// SMTP delivery plus an IMAP inbox, or a drop folder when one is configured
    pub fn new(config: EmailConfig) -> Self {
        if !config.email_enabled {
            info!("Email sending disabled by configuration");
        }
        let transport = Arc::new(SmtpTransport::new(&config));
        let mailbox: Arc<dyn MailboxSource> = match &config.inbox_dir {
            Some(dir) => Arc::new(DropFolderMailbox::new(dir.clone())),
            None => Arc::new(ImapMailbox::new(&config)),
        };
        Self::with_backends(config, transport, mailbox)
    }

    pub fn with_backends(
        config: EmailConfig,
        transport: Arc<dyn MailTransport>,
        mailbox: Arc<dyn MailboxSource>,
    ) -> Self {
        Self {
            config,
            transport,
            mailbox,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.email_enabled
    }

    /// Send an HTML email tagged with the patient id
    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body_html: &str,
        patient_id: &str,
    ) -> EmailResult<SendReceipt> {
        self.deliver(OutgoingEmail {
            to: to.trim().to_string(),
            subject: subject.to_string(),
            html_body: body_html.to_string(),
            patient_id: patient_id.to_string(),
            in_reply_to: None,
        })
        .await
    }

    /// Send a reply threaded onto a patient's message
    pub async fn send_reply(
        &self,
        to: &str,
        subject: &str,
        body_html: &str,
        patient_id: &str,
        in_reply_to: Option<&str>,
    ) -> EmailResult<SendReceipt> {
        self.deliver(OutgoingEmail {
            to: to.trim().to_string(),
            subject: subject.to_string(),
            html_body: body_html.to_string(),
            patient_id: patient_id.to_string(),
            in_reply_to: in_reply_to.filter(|id| !id.is_empty()).map(str::to_string),
        })
        .await
    }

    async fn deliver(&self, email: OutgoingEmail) -> EmailResult<SendReceipt> {
        if !self.config.email_enabled {
            return Err(EmailError::Disabled);
        }
        if !is_plausible_address(&email.to) {
            return Err(EmailError::InvalidRecipient(redact(&email.to)));
        }

        redacted_info!("Sending email to {} (subject: {})", email.to, email.subject);
        if let Err(err) = self.transport.deliver(&email).await {
            warn!(patient_id = %email.patient_id, error = %redact(&err.to_string()), "Email delivery failed");
            return Err(err);
        }

        info!(patient_id = %email.patient_id, "Email sent");
        Ok(SendReceipt {
            message: format!("Email sent to {}", email.to),
            sent_at: Local::now().to_rfc3339(),
        })
    }

    /// Received messages, newest first, optionally only from one sender
    pub async fn fetch_inbox_emails(
        &self,
        sender_filter: Option<&str>,
        limit: usize,
    ) -> EmailResult<Vec<InboxEmail>> {
        if let Some(sender) = sender_filter {
            redacted_info!("Fetching inbox emails from {}", sender);
        }
        let emails = self.mailbox.fetch(sender_filter, limit).await?;
        info!(count = emails.len(), "Fetched inbox emails");
        Ok(emails)
    }
}

fn is_plausible_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !address.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockMailTransport;
    use secrecy::SecretString;
    use std::path::PathBuf;

    fn config(enabled: bool) -> EmailConfig {
        EmailConfig {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "clinic@example.com".to_string(),
            password: SecretString::new("app-password".to_string()),
            from_name: "AIscribe Medical Team".to_string(),
            email_enabled: enabled,
            imap_server: "imap.example.com".to_string(),
            imap_port: 993,
            inbox_dir: Some(PathBuf::from("unused")),
        }
    }

    fn service(enabled: bool, transport: MockMailTransport) -> EmailService {
        EmailService::with_backends(
            config(enabled),
            Arc::new(transport),
            Arc::new(DropFolderMailbox::new("unused")),
        )
    }

    #[tokio::test]
    async fn test_send_tags_patient() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_deliver()
            .withf(|email| {
                email.to == "jane@example.com" && email.patient_id == "P-42" && email.in_reply_to.is_none()
            })
            .times(1)
            .returning(|_| Ok(()));

        let receipt = service(true, transport)
            .send_email(" jane@example.com ", "Visit Summary - Cough", "<p>hi</p>", "P-42")
            .await
            .unwrap();

        assert_eq!(receipt.message, "Email sent to jane@example.com");
    }

    #[tokio::test]
    async fn test_disabled_never_touches_transport() {
        let mut transport = MockMailTransport::new();
        transport.expect_deliver().never();

        let err = service(false, transport)
            .send_email("jane@example.com", "s", "b", "P-1")
            .await
            .unwrap_err();

        assert!(matches!(err, EmailError::Disabled));
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let mut transport = MockMailTransport::new();
        transport.expect_deliver().never();

        let err = service(true, transport)
            .send_email("not-an-address", "s", "b", "P-1")
            .await
            .unwrap_err();

        assert!(matches!(err, EmailError::InvalidRecipient(_)));
    }

    #[tokio::test]
    async fn test_reply_threads_message_id() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_deliver()
            .withf(|email| email.in_reply_to.as_deref() == Some("<abc@mail.example.com>"))
            .times(1)
            .returning(|_| Ok(()));

        service(true, transport)
            .send_reply("jane@example.com", "Re: Visit", "<p>ok</p>", "P-1", Some("<abc@mail.example.com>"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_deliver()
            .returning(|_| Err(EmailError::SendFailed("SMTP connection failed: refused".to_string())));

        let err = service(true, transport)
            .send_email("jane@example.com", "s", "b", "P-1")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("refused"));
    }
}
