use crate::error::{AiError, AiErrorKind, AiResult};

/// Outcome of one model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { text: String },
    Failure { kind: AiErrorKind, reason: String },
}

/// Result of a single (model, credential) attempt. Produced by a
/// [`ModelEndpoint`](crate::ModelEndpoint), never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    pub outcome: Outcome,
    pub model_id: String,
    pub credential_label: String,
}

impl AttemptResult {
    pub fn success(
        text: impl Into<String>,
        model_id: impl Into<String>,
        credential_label: impl Into<String>,
    ) -> Self {
        Self {
            outcome: Outcome::Success { text: text.into() },
            model_id: model_id.into(),
            credential_label: credential_label.into(),
        }
    }

    pub fn failure(
        kind: AiErrorKind,
        reason: impl Into<String>,
        model_id: impl Into<String>,
        credential_label: impl Into<String>,
    ) -> Self {
        Self {
            outcome: Outcome::Failure {
                kind,
                reason: reason.into(),
            },
            model_id: model_id.into(),
            credential_label: credential_label.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { text } => Some(text),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error_reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { reason, .. } => Some(reason),
        }
    }

    pub fn error_kind(&self) -> Option<AiErrorKind> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// `"{model} ({credential label})"`, as stored with generated documents.
    pub fn model_used(&self) -> String {
        format!("{} ({})", self.model_id, self.credential_label)
    }

    /// Split into generated text and `model_used`, or the exhaustion error.
    pub fn into_completion(self) -> AiResult<(String, String)> {
        let model_used = self.model_used();
        match self.outcome {
            Outcome::Success { text } => Ok((text, model_used)),
            Outcome::Failure { kind, reason } => Err(AiError::Exhausted {
                kind,
                reason,
                model_used,
            }),
        }
    }
}
