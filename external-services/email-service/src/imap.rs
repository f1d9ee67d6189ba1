use async_trait::async_trait;
use futures::TryStreamExt;
use mail_parser::MessageParser;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::config::EmailConfig;
use crate::error::{EmailError, EmailResult};
use crate::inbox::{inbox_email_from_message, newest_first, InboxEmail, MailboxSource};

const INBOX_FOLDER: &str = "INBOX";

/// Patient replies read straight from the mail server over IMAP with
/// implicit TLS, using the same login as SMTP.
pub struct ImapMailbox {
    server: String,
    port: u16,
    username: String,
    password: SecretString,
}

impl ImapMailbox {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            server: config.imap_server.clone(),
            port: config.imap_port,
            username: config.username.clone(),
            password: SecretString::new(config.password.expose_secret().clone()),
        }
    }

    fn connector() -> EmailResult<TlsConnector> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let provider = Arc::new(tokio_rustls::rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| EmailError::Mailbox(format!("TLS setup failed: {e}")))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(TlsConnector::from(Arc::new(config)))
    }
}

fn imap_error(e: async_imap::error::Error) -> EmailError {
    EmailError::Mailbox(format!("IMAP: {e}"))
}

/// IMAP SEARCH criteria; a sender filter becomes a quoted `FROM` term.
pub fn search_query(sender_filter: Option<&str>) -> EmailResult<String> {
    let Some(filter) = sender_filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok("ALL".to_string());
    };
    if filter.contains(['\r', '\n']) {
        return Err(EmailError::InvalidRecipient(
            "sender filter contains a line break".to_string(),
        ));
    }
    let escaped = filter.replace('\\', "\\\\").replace('"', "\\\"");
    Ok(format!("FROM \"{escaped}\""))
}

/// Highest `limit` sequence numbers as an IMAP sequence set, `None` when empty.
pub fn latest_sequence_set(ids: &HashSet<u32>, limit: usize) -> Option<String> {
    let mut ids: Vec<u32> = ids.iter().copied().collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids.truncate(limit);
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

#[async_trait]
impl MailboxSource for ImapMailbox {
    async fn fetch(&self, sender_filter: Option<&str>, limit: usize) -> EmailResult<Vec<InboxEmail>> {
        let query = search_query(sender_filter)?;
        let server_name = ServerName::try_from(self.server.clone())
            .map_err(|e| EmailError::Mailbox(format!("invalid IMAP host '{}': {e}", self.server)))?;

        let tcp = TcpStream::connect((self.server.as_str(), self.port))
            .await
            .map_err(|e| EmailError::Mailbox(format!("IMAP connection failed: {e}")))?;
        let tls = Self::connector()?
            .connect(server_name, tcp)
            .await
            .map_err(|e| EmailError::Mailbox(format!("TLS handshake failed: {e}")))?;

        let client = async_imap::Client::new(tls);
        let mut session = client
            .login(&self.username, self.password.expose_secret())
            .await
            .map_err(|(e, _)| imap_error(e))?;

        session.select(INBOX_FOLDER).await.map_err(imap_error)?;
        let ids = session.search(&query).await.map_err(imap_error)?;

        let mut raw_messages = Vec::new();
        if let Some(sequence_set) = latest_sequence_set(&ids, limit) {
            let fetches: Vec<_> = session
                .fetch(sequence_set, "RFC822")
                .await
                .map_err(imap_error)?
                .try_collect()
                .await
                .map_err(imap_error)?;
            for fetch in fetches {
                if let Some(body) = fetch.body() {
                    raw_messages.push((fetch.message, body.to_vec()));
                }
            }
        }

        if let Err(e) = session.logout().await {
            warn!(error = %e, "IMAP logout failed");
        }

        let mut emails = Vec::with_capacity(raw_messages.len());
        for (sequence, raw) in raw_messages {
            let Some(message) = MessageParser::default().parse(&raw) else {
                warn!(sequence, "Skipping unparseable message");
                continue;
            };
            emails.push(inbox_email_from_message(&message, &format!("imap-{sequence}")));
        }

        let emails = newest_first(emails, limit);
        debug!(count = emails.len(), filtered = sender_filter.is_some(), "Fetched IMAP inbox");
        Ok(emails)
    }
}
