//! Logging for AIscribe with PII redaction
//!
//! Installs the global `tracing` subscriber (stderr plus an optional daily
//! rolling file) and exposes [`redact`] and the `redacted_*!` macros for log
//! lines that may carry patient emails, phone numbers or API keys.
//!
//! # Detected Data Types
//!
//! - **Email Addresses**: jane@example.com → `EMAIL[hash]` or j***@e***
//! - **Phone Numbers**: (555) 123-4567 → (***) ***-****
//! - **SSN**: 123-45-6789 → ***-**-****
//! - **Medical Record Numbers**: MRN123456 → MRN******
//! - **API Keys**: sk-or-v1-… / Bearer … → [API_KEY]
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init, redacted_info, LoggerConfig};
//!
//! let _guard = init(&LoggerConfig::from_env()).expect("logger");
//! redacted_info!("emailed visit summary to {}", "jane@example.com");
//! ```

pub mod config;
pub mod macros;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to create log directory: {0}")]
    LogDir(#[from] std::io::Error),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Keeps the background file writer alive; drop it on shutdown to flush.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
pub fn init(config: &LoggerConfig) -> Result<LogGuard, LoggerError> {
    set_redaction_enabled(config.redaction_enabled);

    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| LoggerError::Filter(e.to_string()))?;
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, "aiscribe");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| LoggerError::Install(e.to_string()))?;

        Ok(LogGuard { _file: Some(guard) })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|e| LoggerError::Install(e.to_string()))?;

        Ok(LogGuard { _file: None })
    }
}
