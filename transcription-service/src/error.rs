use error_common::ScribeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read audio file: {0}")]
    Audio(#[from] std::io::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider reached its terminal error state
    #[error("Transcription failed: {0}")]
    Failed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type TranscriptionResult<T> = Result<T, TranscriptionError>;

impl From<TranscriptionError> for ScribeError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::Config(msg) => ScribeError::Config(msg),
            other => ScribeError::Transcription(other.to_string()),
        }
    }
}
