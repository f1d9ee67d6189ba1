//! Splits free-form clinical summary text into sections by literal markers.
//!
//! The markers are echoed back by the model because the clinical summary prompt
//! asks for them verbatim; prompt and parser must change together.

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CHIEF_COMPLAINT_MARKER: &str = "CHIEF_COMPLAINT:";
pub const HISTORY_MARKER: &str = "HISTORY_OF_PRESENT_ILLNESS:";
pub const ASSESSMENT_PLAN_MARKER: &str = "ASSESSMENT_PLAN:";

/// Markers in the order the sections are expected
pub const MARKERS: [&str; 3] = [CHIEF_COMPLAINT_MARKER, HISTORY_MARKER, ASSESSMENT_PLAN_MARKER];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalSummarySections {
    pub chief_complaint: String,
    pub history_of_present_illness: String,
    pub assessment_plan: String,
}

impl ClinicalSummarySections {
    pub fn is_empty(&self) -> bool {
        self.chief_complaint.is_empty()
            && self.history_of_present_illness.is_empty()
            && self.assessment_plan.is_empty()
    }
}

/// Turns raw model output into sections. Never fails.
pub trait SectionParser: Send + Sync {
    fn parse(&self, raw_text: &str) -> ClinicalSummarySections;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerSectionParser;

impl SectionParser for MarkerSectionParser {
    fn parse(&self, raw_text: &str) -> ClinicalSummarySections {
        match split_sections(raw_text.trim()) {
            Some([chief_complaint, history_of_present_illness, assessment_plan]) => {
                ClinicalSummarySections {
                    chief_complaint,
                    history_of_present_illness,
                    assessment_plan,
                }
            }
            None => {
                warn!("Could not split clinical summary, keeping raw text as chief complaint");
                ClinicalSummarySections {
                    chief_complaint: raw_text.to_string(),
                    ..Default::default()
                }
            }
        }
    }
}

/// Parse with the literal-marker parser.
pub fn parse_clinical_sections(raw_text: &str) -> ClinicalSummarySections {
    MarkerSectionParser.parse(raw_text)
}

// A body ends at the nearest marker of any kind found after it, else at end of
// text, so sections never overlap even when markers arrive out of order.
fn split_sections(text: &str) -> Option<[String; 3]> {
    let starts = MARKERS.map(|marker| text.find(marker));
    let mut bodies: [String; 3] = Default::default();

    for (index, (body, marker)) in bodies.iter_mut().zip(MARKERS).enumerate() {
        let Some(position) = starts.get(index).copied().flatten() else {
            continue;
        };
        let body_start = position.saturating_add(marker.len());
        let body_end = starts
            .iter()
            .flatten()
            .copied()
            .filter(|&next| next >= body_start)
            .min()
            .unwrap_or(text.len());

        *body = text.get(body_start..body_end)?.trim().to_string();
    }

    Some(bodies)
}
