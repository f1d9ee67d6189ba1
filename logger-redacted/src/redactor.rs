use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    static ref SSN_REGEX: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
    static ref PHONE_REGEX: Regex =
        Regex::new(r"(?:\+1[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap();
    static ref MRN_REGEX: Regex = Regex::new(r"(?i)\bMRN[-:#\s]?\d{4,}\b").unwrap();
    static ref API_KEY_REGEX: Regex =
        Regex::new(r"\b(?:sk-[A-Za-z0-9_-]{16,}|Bearer\s+[A-Za-z0-9._~+/-]{16,})").unwrap();
    static ref DEFAULT_REDACTOR: PiiRedactor = PiiRedactor::new(RedactionConfig::default());
}

static REDACTION_ENABLED: AtomicBool = AtomicBool::new(true);

/// Kinds of sensitive values recognised in log text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiKind {
    Email,
    Ssn,
    Phone,
    MedicalRecordNumber,
    ApiKey,
}

impl PiiKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Ssn => "SSN",
            Self::Phone => "PHONE",
            Self::MedicalRecordNumber => "MRN",
            Self::ApiKey => "API_KEY",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Email => &EMAIL_REGEX,
            Self::Ssn => &SSN_REGEX,
            Self::Phone => &PHONE_REGEX,
            Self::MedicalRecordNumber => &MRN_REGEX,
            Self::ApiKey => &API_KEY_REGEX,
        }
    }

    fn mask(self, value: &str) -> String {
        match self {
            Self::Email => match value.split_once('@') {
                Some((local, domain)) => format!(
                    "{}***@{}***",
                    local.chars().next().unwrap_or('*'),
                    domain.chars().next().unwrap_or('*')
                ),
                None => "***@***".to_string(),
            },
            Self::Ssn => "***-**-****".to_string(),
            Self::Phone => "(***) ***-****".to_string(),
            Self::MedicalRecordNumber => "MRN******".to_string(),
            Self::ApiKey => "[API_KEY]".to_string(),
        }
    }
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub kinds: Vec<PiiKind>,
    /// Replace values with a short hash so the same address can be followed across log lines.
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            // SSN runs before phone so `123-45-6789` is never half-matched as a number
            kinds: vec![
                PiiKind::ApiKey,
                PiiKind::Email,
                PiiKind::Ssn,
                PiiKind::Phone,
                PiiKind::MedicalRecordNumber,
            ],
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        for kind in &self.config.kinds {
            result = self.redact_kind(*kind, &result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }

        result
    }

    fn redact_kind(&self, kind: PiiKind, text: &str) -> String {
        kind.regex()
            .replace_all(text, |caps: &Captures| {
                let value = &caps[0];
                // API keys are always fully masked
                if self.config.hash_for_correlation && kind != PiiKind::ApiKey {
                    format!("{}[{}]", kind.tag(), hash_value(value))
                } else {
                    kind.mask(value)
                }
            })
            .into_owned()
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(&digest[..6])
}

/// Redact `text` with the default rules, unless redaction was switched off at init.
pub fn redact(text: &str) -> String {
    if REDACTION_ENABLED.load(Ordering::Relaxed) {
        DEFAULT_REDACTOR.redact(text)
    } else {
        text.to_string()
    }
}

pub(crate) fn set_redaction_enabled(enabled: bool) {
    REDACTION_ENABLED.store(enabled, Ordering::Relaxed);
}
