use async_trait::async_trait;
use chrono::{DateTime, Local};
use mail_parser::{Message, MessageParser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{EmailError, EmailResult};
use crate::reply::extract_reply_content;
use crate::PATIENT_ID_HEADER;

pub const UNKNOWN_PATIENT: &str = "unknown";

/// Message received from a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEmail {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    /// Reply text with quoted history removed
    pub body: String,
    pub timestamp: String,
    pub patient_id: String,
    pub in_reply_to: String,
}

/// Source of received messages, newest first
#[async_trait]
pub trait MailboxSource: Send + Sync {
    async fn fetch(&self, sender_filter: Option<&str>, limit: usize) -> EmailResult<Vec<InboxEmail>>;
}

/// Mailbox backed by a folder of raw RFC 5322 `.eml` files, used when
/// `EMAIL_INBOX_DIR` is set instead of IMAP.
pub struct DropFolderMailbox {
    dir: PathBuf,
}

impl DropFolderMailbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn first_address(address: Option<&mail_parser::Address<'_>>) -> String {
    address
        .and_then(|a| a.first())
        .and_then(|addr| addr.address())
        .unwrap_or_default()
        .to_string()
}

fn header_text<'a>(message: &'a Message<'a>, name: &str) -> Option<&'a str> {
    message
        .headers()
        .iter()
        .find(|header| header.name().eq_ignore_ascii_case(name))
        .and_then(|header| header.value().as_text())
}

/// Convert one parsed message; `fallback_id` names messages without a Message-ID.
pub fn inbox_email_from_message(message: &Message<'_>, fallback_id: &str) -> InboxEmail {
    let raw_body = message
        .body_text(0)
        .or_else(|| message.body_html(0))
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let timestamp = message
        .date()
        .map(|date| date.to_rfc3339())
        .unwrap_or_else(|| Local::now().to_rfc3339());

    InboxEmail {
        id: message
            .message_id()
            .map_or_else(|| fallback_id.to_string(), str::to_string),
        from: first_address(message.from()),
        to: first_address(message.to()),
        subject: message.subject().unwrap_or_default().to_string(),
        body: extract_reply_content(&raw_body),
        timestamp,
        patient_id: header_text(message, PATIENT_ID_HEADER)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_PATIENT)
            .to_string(),
        in_reply_to: message.in_reply_to().as_text().unwrap_or_default().to_string(),
    }
}

fn sort_key(email: &InboxEmail) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(&email.timestamp).ok()
}

pub(crate) fn newest_first(mut emails: Vec<InboxEmail>, limit: usize) -> Vec<InboxEmail> {
    emails.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
    emails.truncate(limit);
    emails
}

#[async_trait]
impl MailboxSource for DropFolderMailbox {
    async fn fetch(&self, sender_filter: Option<&str>, limit: usize) -> EmailResult<Vec<InboxEmail>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Inbox folder does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(EmailError::Mailbox(format!("{}: {e}", self.dir.display()))),
        };

        let filter = sender_filter.map(str::to_lowercase);
        let mut emails = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("eml") {
                continue;
            }

            let raw = tokio::fs::read(&path).await?;
            let Some(message) = MessageParser::default().parse(&raw) else {
                warn!(file = %path.display(), "Skipping unparseable message");
                continue;
            };

            let fallback_id = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            let email = inbox_email_from_message(&message, fallback_id);

            if let Some(filter) = &filter {
                if !email.from.to_lowercase().contains(filter.as_str()) {
                    continue;
                }
            }
            emails.push(email);
        }

        let emails = newest_first(emails, limit);
        debug!(count = emails.len(), filtered = filter.is_some(), "Fetched inbox emails");
        Ok(emails)
    }
}
