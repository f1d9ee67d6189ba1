use chrono::Local;
use clinical_ai::ClinicalRecord;
use email_service::InboxEmail;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{EmailDirection, EmailRecord, RecordingId, RecordingSummary, VisitResults};

const RESULTS_SUFFIX: &str = "_results.json";
const EMAIL_SUFFIX: &str = "_email.json";
const INBOX_PREFIX: &str = "inbox_";

/// Filename-safe patient id: ASCII letters, digits, `-`, `_` and inner `.`,
/// whitespace collapsed to `_`. Empty after cleaning is an error.
pub fn sanitize_patient_id(patient_id: &str) -> StoreResult<String> {
    let cleaned = sanitize_component(patient_id);
    if cleaned.is_empty() {
        return Err(StoreError::InvalidId(format!(
            "patient id '{patient_id}' has no usable characters"
        )));
    }
    Ok(cleaned)
}

fn sanitize_component(raw: &str) -> String {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Local time as used in file names, `YYYYMMDD_HHMMSS`
pub fn file_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn inbox_file_name(message_id: &str) -> String {
    let digest = Sha256::digest(message_id.as_bytes());
    let mut name = String::from(INBOX_PREFIX);
    for byte in digest.iter().take(8) {
        let _ = write!(name, "{byte:02x}");
    }
    name.push_str(EMAIL_SUFFIX);
    name
}

/// Audio copied into a patient folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAudio {
    pub timestamp: String,
    pub filename: String,
    pub path: PathBuf,
}

/// Per-patient JSON store rooted at the upload folder
#[derive(Debug, Clone)]
pub struct VisitStore {
    config: StoreConfig,
}

impl VisitStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Folder for a patient; not created
    pub fn patient_dir(&self, patient_id: &str) -> StoreResult<PathBuf> {
        Ok(self.config.upload_folder.join(sanitize_patient_id(patient_id)?))
    }

    async fn ensure_patient_dir(&self, patient_id: &str) -> StoreResult<PathBuf> {
        let dir = self.patient_dir(patient_id)?;
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    pub fn validate_file_type(&self, filename: &str) -> StoreResult<()> {
        if self.config.is_allowed(filename) {
            Ok(())
        } else {
            Err(StoreError::UnsupportedFileType(format!(
                "'{filename}' (allowed: {})",
                self.config.allowed_extensions.join(", ")
            )))
        }
    }

    /// Copy an audio file into the patient's folder as `{ts}_{filename}`
    pub async fn save_audio(&self, patient_id: &str, source: &Path) -> StoreResult<SavedAudio> {
        let original = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StoreError::InvalidId(format!("no file name in {}", source.display())))?;
        self.validate_file_type(original)?;

        let size = fs::metadata(source).await?.len();
        if size > self.config.max_file_size {
            return Err(StoreError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        let dir = self.ensure_patient_dir(patient_id).await?;
        let timestamp = file_timestamp();
        let filename = sanitize_component(original);
        let path = dir.join(format!("{timestamp}_{filename}"));
        fs::copy(source, &path).await?;

        info!(patient_id, file = %path.display(), bytes = size, "Saved audio");
        Ok(SavedAudio {
            timestamp,
            filename,
            path,
        })
    }

    /// Write `{ts}_results.json`
    pub async fn save_results(&self, timestamp: &str, results: &VisitResults) -> StoreResult<PathBuf> {
        let dir = self.ensure_patient_dir(&results.patient_id).await?;
        let path = dir.join(format!("{timestamp}{RESULTS_SUFFIX}"));
        write_json(&path, results).await?;
        info!(patient_id = %results.patient_id, file = %path.display(), "Saved visit results");
        Ok(path)
    }

    /// Write `{ts}_email.json`, or `{ts}_reply_email.json` for replies
    pub async fn save_email_record(
        &self,
        timestamp: &str,
        record: &EmailRecord,
        is_reply: bool,
    ) -> StoreResult<PathBuf> {
        let dir = self.ensure_patient_dir(&record.patient_id).await?;
        let kind = if is_reply { "_reply" } else { "" };
        let path = dir.join(format!("{timestamp}{kind}{EMAIL_SUFFIX}"));
        write_json(&path, record).await?;
        debug!(patient_id = %record.patient_id, file = %path.display(), "Saved email record");
        Ok(path)
    }

    /// File a received message under the patient; `false` if it was already stored
    pub async fn save_inbox_email(&self, patient_id: &str, email: &InboxEmail) -> StoreResult<bool> {
        let dir = self.ensure_patient_dir(patient_id).await?;
        let path = dir.join(inbox_file_name(&email.id));
        if fs::try_exists(&path).await? {
            return Ok(false);
        }
        write_json(&path, &EmailRecord::inbound(email, patient_id)).await?;
        Ok(true)
    }

    pub async fn load_results(&self, id: &RecordingId) -> StoreResult<VisitResults> {
        let path = self
            .patient_dir(&id.patient_id)?
            .join(format!("{}{RESULTS_SUFFIX}", id.timestamp));
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(format!("Recording {id} not found")));
        }
        read_json(&path).await
    }

    /// Every processed recording across patients, newest first
    pub async fn list_recordings(&self) -> StoreResult<Vec<RecordingSummary>> {
        let mut recordings = Vec::new();
        for patient_dir in sub_dirs(&self.config.upload_folder).await? {
            let Some(patient_id) = patient_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            for (name, path) in files_with_suffix(&patient_dir, RESULTS_SUFFIX).await? {
                let results: VisitResults = match read_json(&path).await {
                    Ok(results) => results,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "Skipping unreadable results");
                        continue;
                    }
                };
                let timestamp = name.trim_end_matches(RESULTS_SUFFIX);
                recordings.push(RecordingSummary {
                    recording_id: RecordingId::new(patient_id, timestamp).to_string(),
                    patient_id: patient_id.to_string(),
                    filename: results.filename,
                    recording_type: results.recording_type,
                    chief_complaint: results.clinical_summary.sections.chief_complaint,
                    created_at: results.timestamp,
                });
            }
        }

        recordings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recordings)
    }

    /// Remove a recording's results and audio. Email records are kept.
    pub async fn delete_recording(&self, id: &RecordingId) -> StoreResult<usize> {
        let dir = self.patient_dir(&id.patient_id)?;
        if !fs::try_exists(&dir).await? {
            return Err(StoreError::NotFound(format!("Recording {id} not found")));
        }

        let mut removed = 0usize;
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_results = name == format!("{}{RESULTS_SUFFIX}", id.timestamp);
            let is_audio = name.starts_with(&format!("{}_", id.timestamp))
                && !name.ends_with(RESULTS_SUFFIX)
                && !name.ends_with(EMAIL_SUFFIX);
            if is_results || is_audio {
                fs::remove_file(entry.path()).await?;
                removed = removed.saturating_add(1);
            }
        }

        if removed == 0 {
            return Err(StoreError::NotFound(format!("Recording {id} not found")));
        }
        info!(recording = %id, files = removed, "Deleted recording");
        Ok(removed)
    }

    /// A patient's outbound and inbound mail, newest first
    pub async fn list_emails(&self, patient_id: &str) -> StoreResult<Vec<EmailRecord>> {
        let dir = self.patient_dir(patient_id)?;
        let mut emails = Vec::new();
        for (_, path) in files_with_suffix(&dir, EMAIL_SUFFIX).await? {
            match read_json::<EmailRecord>(&path).await {
                Ok(record) => emails.push(record),
                Err(e) => warn!(file = %path.display(), error = %e, "Skipping unreadable email"),
            }
        }
        emails.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(emails)
    }

    /// Address used in earlier outbound mail to this patient
    pub async fn find_patient_email(&self, patient_id: &str) -> StoreResult<Option<String>> {
        Ok(self
            .list_emails(patient_id)
            .await?
            .into_iter()
            .find(|record| record.direction == EmailDirection::Outbound && record.to.contains('@'))
            .map(|record| record.to))
    }

    /// Clinical summaries of every stored visit, oldest first
    pub async fn collect_clinical_records(&self, patient_id: &str) -> StoreResult<Vec<ClinicalRecord>> {
        let dir = self.patient_dir(patient_id)?;
        if !fs::try_exists(&dir).await? {
            return Err(StoreError::NotFound(
                "No records found for this patient".to_string(),
            ));
        }

        let mut visits = Vec::new();
        for (_, path) in files_with_suffix(&dir, RESULTS_SUFFIX).await? {
            match read_json::<VisitResults>(&path).await {
                Ok(results) if !results.clinical_summary.sections.is_empty() => visits.push(results),
                Ok(_) => {}
                Err(e) => warn!(file = %path.display(), error = %e, "Skipping unreadable results"),
            }
        }
        visits.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        Ok(visits
            .into_iter()
            .map(|visit| ClinicalRecord {
                visit_date: visit.timestamp,
                sections: visit.clinical_summary.sections,
            })
            .collect())
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json).await?;
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn sub_dirs(root: &Path) -> StoreResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(dirs),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

/// `(file name, path)` pairs in `dir` ending with `suffix`; missing dir is empty
async fn files_with_suffix(dir: &Path, suffix: &str) -> StoreResult<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(suffix) {
            files.push((name, entry.path()));
        }
    }
    Ok(files)
}
