pub mod assemblyai;

use async_trait::async_trait;
use std::path::Path;

use crate::config::{ProviderKind, TranscriptionConfig};
use crate::error::TranscriptionResult;
use crate::transcription::Transcript;

/// Trait for speech-to-text providers
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe an audio file, waiting until the provider reports a terminal status.
    async fn transcribe(&self, audio_path: &Path, diarize: bool) -> TranscriptionResult<Transcript>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}

/// Create a provider instance based on configuration
pub fn create_provider(config: TranscriptionConfig) -> TranscriptionResult<Box<dyn TranscriptionProvider>> {
    match config.provider {
        ProviderKind::AssemblyAi => Ok(Box::new(assemblyai::AssemblyAiProvider::new(config)?)),
    }
}
