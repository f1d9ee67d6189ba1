use error_common::ScribeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structured reason a single model attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiErrorKind {
    Timeout,
    Authentication,
    RateLimited,
    Server,
    Network,
    InvalidRequest,
    Parse,
    Unknown,
}

impl AiErrorKind {
    /// Classify a non-success HTTP status from the model endpoint.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimited,
            408 | 504 => Self::Timeout,
            400 | 404 | 413 | 422 => Self::InvalidRequest,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Authentication => "auth",
            Self::RateLimited => "rate_limit",
            Self::Server => "server",
            Self::Network => "network",
            Self::InvalidRequest => "invalid_request",
            Self::Parse => "parse",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AiError {
    /// Every entry of the escalation plan failed; carries the last attempt only.
    #[error("All model attempts failed, last error ({kind}) from {model_used}: {reason}")]
    Exhausted {
        kind: AiErrorKind,
        reason: String,
        model_used: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No clinical records found for patient {0}")]
    NoRecords(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AiResult<T> = Result<T, AiError>;

impl From<AiError> for ScribeError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::InvalidInput(msg) => ScribeError::Validation(msg),
            AiError::Config(msg) => ScribeError::Config(msg),
            other => ScribeError::AiGeneration(other.to_string()),
        }
    }
}
