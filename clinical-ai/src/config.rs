use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::{AiError, AiResult};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";
pub const DEFAULT_FALLBACK_MODEL: &str = "deepseek/deepseek-r1-distill-llama-70b:free";
pub const DEFAULT_VISION_MODEL: &str = "openai/gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const PRIMARY_CREDENTIAL_LABEL: &str = "Primary API";
pub const BACKUP_CREDENTIAL_LABEL: &str = "Backup API";

/// API key bound to one provider account, with the label used in logs and `model_used`.
pub struct Credential {
    label: String,
    api_key: SecretString,
}

impl Credential {
    pub fn new(label: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            api_key: SecretString::new(api_key.into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("label", &self.label)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Read-only configuration shared by every orchestration run
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub base_url: String,
    pub primary_model: String,
    pub fallback_model: String,
    /// Image-capable model for chat questions with an attachment
    pub vision_model: String,
    pub primary_credential: Arc<Credential>,
    pub backup_credential: Arc<Credential>,
    pub temperature: f32,
    /// Transport-level timeout of a single request; there is no deadline across attempts.
    pub request_timeout: Duration,
}

impl AiConfig {
    /// Configuration with default endpoint and models.
    ///
    /// Without a backup key the primary key is reused under the backup label, so
    /// the escalation still makes four calls.
    pub fn new(primary_key: impl Into<String>, backup_key: Option<String>) -> Self {
        let primary_key = primary_key.into();
        let backup_key = backup_key.unwrap_or_else(|| primary_key.clone());

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            primary_credential: Arc::new(Credential::new(PRIMARY_CREDENTIAL_LABEL, primary_key)),
            backup_credential: Arc::new(Credential::new(BACKUP_CREDENTIAL_LABEL, backup_key)),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> AiResult<Self> {
        let primary_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::Config("OPENROUTER_API_KEY is not set".to_string()))?;

        let backup_key = std::env::var("OPENROUTER_API_KEY_BACKUP")
            .ok()
            .filter(|key| !key.trim().is_empty());
        if backup_key.is_none() {
            warn!("OPENROUTER_API_KEY_BACKUP not set, backup attempts reuse the primary key");
        }

        let mut config = Self::new(primary_key, backup_key);

        if let Ok(base_url) = std::env::var("OPENROUTER_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("AISCRIBE_PRIMARY_MODEL") {
            config.primary_model = model;
        }
        if let Ok(model) = std::env::var("AISCRIBE_FALLBACK_MODEL") {
            config.fallback_model = model;
        }
        if let Ok(model) = std::env::var("AISCRIBE_VISION_MODEL") {
            config.vision_model = model;
        }
        config.request_timeout = Duration::from_secs(
            std::env::var("AISCRIBE_AI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        Ok(config)
    }

    /// Point the configuration at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(mut self, primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.primary_model = primary.into();
        self.fallback_model = fallback.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_missing_backup_reuses_primary_key() {
        let config = AiConfig::new("sk-primary", None);

        assert_eq!(config.primary_credential.label(), PRIMARY_CREDENTIAL_LABEL);
        assert_eq!(config.backup_credential.label(), BACKUP_CREDENTIAL_LABEL);
        assert_eq!(config.backup_credential.api_key().expose_secret(), "sk-primary");
    }

    #[test]
    fn test_debug_hides_key() {
        let credential = Credential::new("Primary API", "sk-or-v1-secret");
        let rendered = format!("{credential:?}");

        assert!(!rendered.contains("sk-or-v1-secret"));
        assert!(rendered.contains("Primary API"));
    }

    #[test]
    fn test_defaults() {
        let config = AiConfig::new("k", Some("b".to_string()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.primary_model, DEFAULT_PRIMARY_MODEL);
        assert_eq!(config.fallback_model, DEFAULT_FALLBACK_MODEL);
        assert_eq!(config.vision_model, DEFAULT_VISION_MODEL);
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    }
}
