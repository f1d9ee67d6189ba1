use serde::Serialize;
use thiserror::Error;

use crate::codes;
use crate::context::ErrorContext;

/// Workspace-wide error, converted into from each service crate's own error type
#[derive(Error, Debug)]
pub enum ScribeError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Signup/login errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Speech-to-text failures
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Every model attempt failed
    #[error("AI generation error: {0}")]
    AiGeneration(String),

    /// SMTP or inbox failures
    #[error("Email error: {0}")]
    Email(String),

    /// Persistence failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScribeError {
    /// Stable code for this error, suitable for client responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(msg) if msg.contains("required") => {
                codes::validation::MISSING_REQUIRED_FIELD
            }
            Self::Validation(msg) if msg.contains("file type") => {
                codes::validation::UNSUPPORTED_FILE_TYPE
            }
            Self::Validation(_) => codes::validation::INVALID_INPUT,
            Self::Authentication(msg) if msg.contains("already") => {
                codes::authentication::ACCOUNT_EXISTS
            }
            Self::Authentication(_) => codes::authentication::INVALID_CREDENTIALS,
            Self::Transcription(_) => codes::transcription::PROVIDER_FAILED,
            Self::AiGeneration(msg) if msg.contains("No clinical records") => codes::ai::NO_RECORDS,
            Self::AiGeneration(_) => codes::ai::ESCALATION_EXHAUSTED,
            Self::Email(_) => codes::email::DELIVERY_FAILED,
            Self::Storage(_) => codes::storage::IO_FAILED,
            Self::NotFound(_) => codes::storage::NOT_FOUND,
            Self::Config(_) => codes::system::CONFIGURATION,
            Self::Internal(_) | Self::Other(_) => codes::system::INTERNAL,
        }
    }

    /// Short category name used in structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authentication(_) => "authentication",
            Self::Transcription(_) => "transcription",
            Self::AiGeneration(_) => "ai_generation",
            Self::Email(_) => "email",
            Self::Storage(_) => "storage",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "configuration",
            Self::Internal(_) | Self::Other(_) => "internal",
        }
    }

    /// Serializable `{success: false, error, code}` body.
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            success: false,
            error: self.to_string(),
            code: self.code().to_string(),
        }
    }
}

/// Failure body printed by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub success: bool,
    pub error: String,
    pub code: String,
}

/// Result type alias for AIscribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Log an error together with its request context
pub fn log_error(context: &ErrorContext, error: &ScribeError) {
    tracing::error!(
        request_id = context.request_id.as_deref().unwrap_or("-"),
        operation = context.operation.as_deref().unwrap_or("-"),
        error_code = error.code(),
        error_type = error.error_type(),
        error = %error,
        "AIscribe error occurred"
    );
}
