//! Keyword routing of chat questions to a platform or medical context.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prompts::{MEDICAL_CONTEXT, PLATFORM_CONTEXT, VISION_SYSTEM_PROMPT};

pub const PLATFORM_TERMS: &[&str] = &[
    "how to",
    "how do i",
    "where is",
    "where can i",
    "how can i",
    "record",
    "upload",
    "recording",
    "save",
    "delete",
    "email",
    "patient folder",
    "search",
    "login",
    "sign up",
    "account",
    "dashboard",
    "interface",
    "button",
    "click",
    "navigate",
    "feature",
    "use",
    "aiscribe",
    "platform",
    "system",
    "transcript",
    "summary",
    "export",
    "download",
];

pub const MEDICAL_TERMS: &[&str] = &[
    "symptom",
    "disease",
    "condition",
    "diagnosis",
    "treatment",
    "medication",
    "drug",
    "icd",
    "cpt",
    "medical",
    "clinical",
    "patient",
    "fever",
    "infection",
    "pain",
    "doctor",
    "therapy",
    "prescription",
    "dosage",
    "side effect",
    "anatomy",
    "physiology",
    "pathology",
    "syndrome",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryDecision {
    Platform,
    Medical,
    /// Question with an attached image; never chosen from keywords
    Vision,
}

impl CategoryDecision {
    /// System context prepended to the chat prompt.
    pub fn context(self) -> &'static str {
        match self {
            Self::Platform => PLATFORM_CONTEXT,
            Self::Medical => MEDICAL_CONTEXT,
            Self::Vision => VISION_SYSTEM_PROMPT,
        }
    }

    /// Name shown to the user as the answering assistant.
    pub fn branding(self) -> &'static str {
        match self {
            Self::Platform => "AIscribe Assistant",
            Self::Medical => "Clinical-AI (Medical Language Model)",
            Self::Vision => "Clinical-AI (Vision)",
        }
    }
}

impl fmt::Display for CategoryDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => f.write_str("platform"),
            Self::Medical => f.write_str("medical"),
            Self::Vision => f.write_str("vision"),
        }
    }
}

/// Number of terms from `terms` contained anywhere in the already lowercased message.
fn count_terms(lowered: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| lowered.contains(*term)).count()
}

/// `(platform, medical)` term counts for a message.
pub fn term_counts(message: &str) -> (usize, usize) {
    let lowered = message.to_lowercase();
    (
        count_terms(&lowered, PLATFORM_TERMS),
        count_terms(&lowered, MEDICAL_TERMS),
    )
}

/// Platform only when platform terms strictly outnumber medical ones.
/// Ties and messages matching nothing are medical.
pub fn categorize(message: &str) -> CategoryDecision {
    let (platform, medical) = term_counts(message);
    if platform > medical {
        CategoryDecision::Platform
    } else {
        CategoryDecision::Medical
    }
}
