use async_trait::async_trait;
use mail_builder::headers::text::Text;
use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::EmailConfig;
use crate::error::{EmailError, EmailResult};
use crate::{AISCRIBE_TYPE_HEADER, PATIENT_ID_HEADER, VISIT_SUMMARY_TYPE};

/// Message handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub patient_id: String,
    /// Message-ID of the patient email being answered
    pub in_reply_to: Option<String>,
}

/// Delivers composed messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, email: &OutgoingEmail) -> EmailResult<()>;
}

/// SMTP submission with STARTTLS and login
pub struct SmtpTransport {
    server: String,
    port: u16,
    username: String,
    password: SecretString,
    from_name: String,
}

impl SmtpTransport {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            server: config.smtp_server.clone(),
            port: config.smtp_port,
            username: config.username.clone(),
            password: SecretString::new(config.password.expose_secret().clone()),
            from_name: config.from_name.clone(),
        }
    }

    fn build<'a>(&'a self, email: &'a OutgoingEmail) -> MessageBuilder<'a> {
        let mut message = MessageBuilder::new()
            .from((self.from_name.as_str(), self.username.as_str()))
            .to(email.to.as_str())
            .reply_to(self.username.as_str())
            .subject(email.subject.as_str())
            .header(PATIENT_ID_HEADER, Text::new(email.patient_id.as_str()))
            .header(AISCRIBE_TYPE_HEADER, Text::new(VISIT_SUMMARY_TYPE))
            .html_body(email.html_body.as_str());

        if let Some(in_reply_to) = &email.in_reply_to {
            message = message.in_reply_to(in_reply_to.as_str());
        }
        message
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> EmailResult<()> {
        let message = self.build(email);

        // implicit_tls(false) upgrades the plain connection with STARTTLS
        let mut client = SmtpClientBuilder::new(self.server.as_str(), self.port)
            .implicit_tls(false)
            .credentials((self.username.as_str(), self.password.expose_secret().as_str()))
            .connect()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP connection failed: {e}")))?;

        client
            .send(message)
            .await
            .map_err(|e| EmailError::SendFailed(format!("Failed to send email: {e}")))?;

        debug!(provider = "smtp", server = %self.server, "Email handed to SMTP server");
        Ok(())
    }
}
