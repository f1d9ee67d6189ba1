use clinical_ai::{ClinicalSummary, MdmSummary};
use email_service::InboxEmail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use transcription_service::Transcript;

use crate::error::StoreError;

/// How the audio was captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingType {
    /// Doctor and patient talking; transcribed with speaker labels
    #[default]
    Conversation,
    /// Doctor dictation; one speaker
    Notes,
}

impl RecordingType {
    pub fn diarize(self) -> bool {
        self == Self::Conversation
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Notes => "notes",
        }
    }
}

impl fmt::Display for RecordingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordingType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conversation" => Ok(Self::Conversation),
            "notes" => Ok(Self::Notes),
            other => Err(StoreError::InvalidId(format!("unknown recording type '{other}'"))),
        }
    }
}

/// Everything produced for one processed recording (`{ts}_results.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitResults {
    /// RFC 3339 processing time
    pub timestamp: String,
    pub filename: String,
    pub patient_id: String,
    pub recording_type: RecordingType,
    pub transcription: Transcript,
    pub conversation_text: String,
    pub clinical_summary: ClinicalSummary,
    pub mdm_summary: Option<MdmSummary>,
    /// Why MDM coding is missing, when it is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdm_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailDirection {
    Outbound,
    Inbound,
}

/// Stored copy of a message to or from a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub timestamp: String,
    pub patient_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub direction: EmailDirection,
    #[serde(default)]
    pub sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    /// Sender, for inbound mail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Message-ID, for inbound mail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl EmailRecord {
    /// Unsent outbound record; `mark_sent`/`mark_failed` fill in the outcome
    pub fn outbound(patient_id: &str, to: &str, subject: &str, body: &str) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            patient_id: patient_id.to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            direction: EmailDirection::Outbound,
            sent: false,
            sent_at: None,
            send_error: None,
            in_reply_to: None,
            from: None,
            id: None,
        }
    }

    /// Inbound record filed under `patient_id`, which may differ from the header value
    pub fn inbound(email: &InboxEmail, patient_id: &str) -> Self {
        Self {
            timestamp: email.timestamp.clone(),
            patient_id: patient_id.to_string(),
            to: email.to.clone(),
            subject: email.subject.clone(),
            body: email.body.clone(),
            direction: EmailDirection::Inbound,
            sent: false,
            sent_at: None,
            send_error: None,
            in_reply_to: Some(email.in_reply_to.clone()).filter(|id| !id.is_empty()),
            from: Some(email.from.clone()),
            id: Some(email.id.clone()),
        }
    }

    pub fn with_in_reply_to(mut self, in_reply_to: Option<&str>) -> Self {
        self.in_reply_to = in_reply_to.map(str::to_string);
        self
    }

    pub fn mark_sent(&mut self, sent_at: String) {
        self.sent = true;
        self.sent_at = Some(sent_at);
        self.send_error = None;
    }

    pub fn mark_failed(&mut self, error: String) {
        self.sent = false;
        self.send_error = Some(error);
    }
}

/// Listing entry for one processed recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingSummary {
    /// `{patient_id}/{timestamp}`
    pub recording_id: String,
    pub patient_id: String,
    pub filename: String,
    pub recording_type: RecordingType,
    pub chief_complaint: String,
    pub created_at: String,
}

/// Parsed `{patient_id}/{timestamp}` recording address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingId {
    pub patient_id: String,
    pub timestamp: String,
}

impl RecordingId {
    pub fn new(patient_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            timestamp: timestamp.into(),
        }
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.patient_id, self.timestamp)
    }
}

impl FromStr for RecordingId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (patient_id, timestamp) = s
            .split_once('/')
            .ok_or_else(|| StoreError::InvalidId(format!("expected patient/timestamp, got '{s}'")))?;

        let well_formed = timestamp.len() == 15
            && timestamp
                .chars()
                .enumerate()
                .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() });
        if patient_id.is_empty() || !well_formed {
            return Err(StoreError::InvalidId(format!("malformed recording id '{s}'")));
        }

        Ok(Self::new(patient_id, timestamp))
    }
}
