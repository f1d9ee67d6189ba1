use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

use crate::error::{TranscriptionError, TranscriptionResult};

pub const DEFAULT_ASSEMBLYAI_URL: &str = "https://api.assemblyai.com";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
/// Doctor and patient
pub const DEFAULT_SPEAKERS_EXPECTED: u8 = 2;

/// Speech-to-text provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    AssemblyAi,
}

/// Transcription service configuration
pub struct TranscriptionConfig {
    pub provider: ProviderKind,
    pub api_url: String,
    pub api_key: SecretString,
    /// Delay between status checks; polling has no overall deadline
    pub poll_interval: Duration,
    pub speakers_expected: u8,
}

impl fmt::Debug for TranscriptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("poll_interval", &self.poll_interval)
            .field("speakers_expected", &self.speakers_expected)
            .finish_non_exhaustive()
    }
}

impl TranscriptionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::AssemblyAi,
            api_url: DEFAULT_ASSEMBLYAI_URL.to_string(),
            api_key: SecretString::new(api_key.into()),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            speakers_expected: DEFAULT_SPEAKERS_EXPECTED,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> TranscriptionResult<Self> {
        let provider = match std::env::var("TRANSCRIPTION_PROVIDER") {
            Ok(name) => match name.to_lowercase().as_str() {
                "assemblyai" | "assembly-ai" => ProviderKind::AssemblyAi,
                _ => {
                    return Err(TranscriptionError::Config(format!(
                        "Unknown transcription provider: {name}"
                    )))
                }
            },
            Err(_) => ProviderKind::AssemblyAi,
        };

        let api_key = std::env::var("ASSEMBLYAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| TranscriptionError::Config("ASSEMBLYAI_API_KEY is not set".to_string()))?;

        let poll_interval = std::env::var("TRANSCRIPTION_POLL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let speakers_expected = std::env::var("TRANSCRIPTION_SPEAKERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SPEAKERS_EXPECTED);

        Ok(Self {
            provider,
            api_url: std::env::var("ASSEMBLYAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_ASSEMBLYAI_URL.to_string()),
            api_key: SecretString::new(api_key),
            poll_interval: Duration::from_secs(poll_interval),
            speakers_expected,
        })
    }
}
