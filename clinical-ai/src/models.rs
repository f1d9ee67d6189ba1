use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::categorizer::CategoryDecision;
use crate::parser::ClinicalSummarySections;

/// Parsed clinical note plus the model that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalSummary {
    #[serde(flatten)]
    pub sections: ClinicalSummarySections,
    pub model_used: String,
    /// Unsplit model output, shown when the sections came back empty
    #[serde(default)]
    pub raw_response: String,
}

/// Medical decision making analysis, kept as the model wrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdmSummary {
    pub mdm_summary: String,
    pub model_used: String,
}

/// One past visit fed into the health summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub visit_date: String,
    pub sections: ClinicalSummarySections,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub summary: String,
    pub total_visits: usize,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub category: CategoryDecision,
    pub model_used: String,
}

/// Image attached to a chat question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Inline `data:` URL with the base64-encoded image
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_encodes_image() {
        let image = ImageAttachment::new(vec![0x89, b'P', b'N', b'G'], "image/png");
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw==");
    }
}
