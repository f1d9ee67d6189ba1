use std::path::Path;
use tracing::info;

use crate::config::TranscriptionConfig;
use crate::error::TranscriptionResult;
use crate::providers::{create_provider, TranscriptionProvider};
use crate::transcription::Transcript;

/// Transcription service for recorded visits
pub struct TranscriptionService {
    provider: Box<dyn TranscriptionProvider>,
}

impl TranscriptionService {
    /// Create a new transcription service
    pub fn new(config: TranscriptionConfig) -> TranscriptionResult<Self> {
        Ok(Self::with_provider(create_provider(config)?))
    }

    pub fn with_provider(provider: Box<dyn TranscriptionProvider>) -> Self {
        Self { provider }
    }

    /// Transcribe a recording. `diarize` selects conversation mode over notes mode.
    pub async fn transcribe_audio(&self, audio_path: &Path, diarize: bool) -> TranscriptionResult<Transcript> {
        info!(
            provider = self.provider.name(),
            mode = if diarize { "conversation" } else { "notes" },
            "Starting transcription"
        );
        self.provider.transcribe(audio_path, diarize).await
    }
}
