// Logger configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// EnvFilter directive, e.g. `info` or `clinical_ai=debug,info`
    pub log_level: String,
    pub redaction_enabled: bool,
    /// Directory for the daily rolling `aiscribe` log file
    pub log_dir: PathBuf,
    pub file_logging: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            redaction_enabled: true,
            log_dir: PathBuf::from("logs"),
            file_logging: false,
        }
    }
}

impl LoggerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("AISCRIBE_LOG").unwrap_or(defaults.log_level),
            redaction_enabled: std::env::var("AISCRIBE_LOG_REDACT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.redaction_enabled),
            log_dir: std::env::var("AISCRIBE_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            file_logging: std::env::var("AISCRIBE_LOG_FILE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.file_logging),
        }
    }
}
