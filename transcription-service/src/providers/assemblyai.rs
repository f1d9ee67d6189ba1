//! AssemblyAI provider: upload, create a transcript job, poll until terminal.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::TranscriptionConfig;
use crate::error::{TranscriptionError, TranscriptionResult};
use crate::providers::TranscriptionProvider;
use crate::transcription::{assign_roles, notes_dialogue, Transcript, Utterance};

pub struct AssemblyAiProvider {
    client: Client,
    config: TranscriptionConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    speaker_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    speakers_expected: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
    status: JobStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    audio_duration: Option<f64>,
    #[serde(default)]
    utterances: Option<Vec<Utterance>>,
}

impl AssemblyAiProvider {
    pub fn new(config: TranscriptionConfig) -> TranscriptionResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| TranscriptionError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn upload(&self, audio: Vec<u8>) -> TranscriptionResult<String> {
        let response = self
            .client
            .post(self.url("/v2/upload"))
            .header("authorization", self.config.api_key.expose_secret())
            .header("content-type", "application/octet-stream")
            .body(audio)
            .send()
            .await?;

        let upload: UploadResponse = Self::decode(response).await?;
        Ok(upload.upload_url)
    }

    async fn create_job(&self, audio_url: &str, diarize: bool) -> TranscriptionResult<TranscriptJob> {
        let request = TranscriptRequest {
            audio_url,
            speaker_labels: diarize,
            speakers_expected: diarize.then_some(self.config.speakers_expected),
        };

        let response = self
            .client
            .post(self.url("/v2/transcript"))
            .header("authorization", self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn fetch_job(&self, id: &str) -> TranscriptionResult<TranscriptJob> {
        let response = self
            .client
            .get(self.url(&format!("/v2/transcript/{id}")))
            .header("authorization", self.config.api_key.expose_secret())
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> TranscriptionResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TranscriptionError::Provider(format!(
                "AssemblyAI returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Poll until the job is completed or errored.
    async fn wait_for_completion(&self, mut job: TranscriptJob) -> TranscriptionResult<TranscriptJob> {
        while matches!(job.status, JobStatus::Queued | JobStatus::Processing) {
            debug!(transcript_id = %job.id, status = ?job.status, "Transcription in progress");
            tokio::time::sleep(self.config.poll_interval).await;
            job = self.fetch_job(&job.id).await?;
        }
        Ok(job)
    }
}

#[async_trait]
impl TranscriptionProvider for AssemblyAiProvider {
    async fn transcribe(&self, audio_path: &Path, diarize: bool) -> TranscriptionResult<Transcript> {
        let audio = tokio::fs::read(audio_path).await?;
        info!(path = %audio_path.display(), bytes = audio.len(), diarize, "Uploading audio file");

        let audio_url = self.upload(audio).await?;
        let job = self.create_job(&audio_url, diarize).await?;
        info!(transcript_id = %job.id, "Transcription job created");

        let job = self.wait_for_completion(job).await?;
        if job.status == JobStatus::Error {
            let reason = job.error.unwrap_or_else(|| "unknown provider error".to_string());
            warn!(transcript_id = %job.id, error = %reason, "Transcription failed");
            return Err(TranscriptionError::Failed(reason));
        }

        let full_text = job.text.unwrap_or_default();
        let dialogue = if diarize {
            let utterances = job.utterances.unwrap_or_default();
            if utterances.is_empty() {
                warn!(transcript_id = %job.id, "No utterances found in transcript");
            }
            assign_roles(&utterances)
        } else {
            notes_dialogue(&full_text, job.confidence)
        };

        info!(
            transcript_id = %job.id,
            entries = dialogue.len(),
            chars = full_text.len(),
            "Transcription completed"
        );

        Ok(Transcript {
            full_text,
            dialogue,
            confidence: job.confidence,
            duration_secs: job.audio_duration,
            is_diarized: diarize,
        })
    }

    fn name(&self) -> &'static str {
        "assemblyai"
    }
}
