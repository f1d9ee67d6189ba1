//! Prompt templates for every generation task.

use crate::models::ClinicalRecord;
use crate::parser::{ClinicalSummarySections, ASSESSMENT_PLAN_MARKER, CHIEF_COMPLAINT_MARKER, HISTORY_MARKER};

pub const SYSTEM_PROMPT: &str = "You are an expert medical documentation assistant specializing in clinical notes and medical coding.";

pub const PLATFORM_CONTEXT: &str = "You are AIscribe assistant. Help users with platform features.

Key Features:
- START button → Enter patient ID → Record/Upload audio
- Patient folders on dashboard (collapsible)
- Email icon for patient communication
- Search bar for finding patients
- Click recording to view transcript & summaries

Be concise and clear.";

pub const MEDICAL_CONTEXT: &str = "You are a medical AI assistant. Provide accurate medical information.
Always remind users to consult healthcare professionals. Be concise and evidence-based.";

/// Question used when an image arrives without text
pub const DEFAULT_VISION_QUESTION: &str = "What is in this image?";

pub const VISION_SYSTEM_PROMPT: &str = "You are an experienced medical imaging specialist and clinical consultant providing a second opinion to practicing physicians. Your role is to offer detailed, evidence-based insights that help doctors in their diagnostic process.

Guidelines:
- Provide thorough, professional analysis of medical images
- Highlight key findings, abnormalities, or areas of concern
- Suggest differential diagnoses when appropriate
- Reference relevant clinical indicators and patterns
- Use precise medical terminology
- Note that your analysis is for consultation purposes, not definitive diagnosis
- Critically analyze the image and name medical issues such as fractures or other injuries visible in it.
Remember: Doctors will use your insights as a second opinion to inform their clinical judgment, not as a replacement for their professional decision-making.";

/// Placeholder for an empty section inside a prompt
const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

pub fn clinical_summary_prompt(conversation: &str) -> String {
    format!(
        "You are a medical documentation assistant. Based on the following doctor-patient conversation, create a comprehensive medical note with the following sections:

1. **Chief Complaint**: Brief statement of the main reason for visit (1-2 sentences)
2. **History of Present Illness**: Detailed description of symptoms, severity, duration, and clinical observations
3. **Assessment/Plan**: Diagnosis, medications prescribed, and recommendations

Conversation:
{conversation}

Format your response EXACTLY as follows:

{chief}
[content here]

{history}
[content here]

{assessment}
[content here]

Be concise, professional, and include all relevant medical details mentioned in the conversation.",
        chief = CHIEF_COMPLAINT_MARKER,
        history = HISTORY_MARKER,
        assessment = ASSESSMENT_PLAN_MARKER,
    )
}

pub fn medical_decision_making_prompt(conversation: &str, summary: &ClinicalSummarySections) -> String {
    format!(
        "You are a medical coding and documentation specialist. Based on the following clinical information, provide a comprehensive Medical Decision Making (MDM) analysis.

CONVERSATION:
{conversation}

CLINICAL SUMMARY:
Chief Complaint: {chief_complaint}
History: {history}
Assessment/Plan: {assessment_plan}

Provide a detailed MDM analysis with the following structure:

**Step 1: ICD-10-CM Coding**
- List relevant ICD-10-CM codes with descriptions
- Provide justification for each code

**Step 2: CPT Coding**
- List relevant CPT codes with descriptions
- Provide justification based on the visit complexity

**Step 3: Medical Decision-Making (MDM)**
1. **Number of diagnoses or management options**: [Low/Moderate/High]
   - Justification: [explain]
2. **Amount and/or complexity of data reviewed and analyzed**: [Minimal/Limited/Moderate/Extensive]
   - Justification: [explain]
3. **Risk of complications and/or morbidity or mortality of management**: [Low/Moderate/High]
   - Justification: [explain]

**Overall MDM Level**: [Straightforward/Low/Moderate/High]
- Justification: [explain]

**Final Step: Consistency Check**
- Verify that ICD-10-CM codes, CPT codes, and MDM level are consistent with documentation

Be specific, accurate, highlight headings and subheadings and follow medical coding guidelines.",
        chief_complaint = or_na(&summary.chief_complaint),
        history = or_na(&summary.history_of_present_illness),
        assessment_plan = or_na(&summary.assessment_plan),
    )
}

/// One visit block of the health summary prompt.
pub fn format_record(record: &ClinicalRecord) -> String {
    format!(
        "Visit Date: {date}\nChief Complaint: {cc}\nHistory of Present Illness: {hpi}\nAssessment and Plan: {ap}\n---",
        date = record.visit_date,
        cc = or_na(&record.sections.chief_complaint),
        hpi = or_na(&record.sections.history_of_present_illness),
        ap = or_na(&record.sections.assessment_plan),
    )
}

pub fn health_summary_prompt(patient_id: &str, records: &[ClinicalRecord]) -> String {
    let all_records = records.iter().map(format_record).collect::<Vec<_>>().join("\n\n");

    format!(
        "You are a medical records specialist. Based on the following clinical records for patient {patient_id}, create a comprehensive health history summary.

CLINICAL RECORDS:
{all_records}

Please provide a detailed health summary including:
1. **Patient Overview**: Brief introduction
2. **Medical History Timeline**: Chronological summary of visits and conditions
3. **Recurring Conditions**: Any patterns or recurring health issues
4. **Current Health Status**: Latest assessment
5. **Treatment Summary**: Medications and interventions prescribed
6. **Follow-up Recommendations**: Any ongoing care needs

Be professional, concise, and focus on key medical information. Format with clear headers and bullet points."
    )
}

pub fn chat_prompt(context: &str, message: &str) -> String {
    format!("{context}\n\nQuestion: {message}\n\nAnswer:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_clinical_sections;

    #[test]
    fn test_clinical_prompt_carries_markers_and_conversation() {
        let prompt = clinical_summary_prompt("doctor: hi\npatient: sore throat");

        assert!(prompt.contains("patient: sore throat"));
        for marker in crate::parser::MARKERS {
            assert!(prompt.contains(marker), "missing marker {marker}");
        }
    }

    #[test]
    fn test_template_echo_parses() {
        // a model that echoes the format block verbatim must still parse
        let prompt = clinical_summary_prompt("x");
        let echoed = &prompt[prompt.find(CHIEF_COMPLAINT_MARKER).unwrap()..];
        let sections = parse_clinical_sections(echoed);

        assert_eq!(sections.chief_complaint, "[content here]");
        assert_eq!(sections.history_of_present_illness, "[content here]");
    }

    #[test]
    fn test_mdm_prompt_fills_missing_sections() {
        let summary = ClinicalSummarySections {
            chief_complaint: "Cough".to_string(),
            ..Default::default()
        };
        let prompt = medical_decision_making_prompt("conv", &summary);

        assert!(prompt.contains("Chief Complaint: Cough"));
        assert!(prompt.contains("History: N/A"));
        assert!(prompt.contains("Assessment/Plan: N/A"));
    }

    #[test]
    fn test_chat_prompt_shape() {
        assert_eq!(chat_prompt("CTX", "why?"), "CTX\n\nQuestion: why?\n\nAnswer:");
    }

    #[test]
    fn test_health_prompt_lists_every_visit() {
        let records = vec![
            ClinicalRecord {
                visit_date: "2026-01-02T10:00:00".to_string(),
                sections: ClinicalSummarySections {
                    chief_complaint: "Migraine".to_string(),
                    ..Default::default()
                },
            },
            ClinicalRecord {
                visit_date: "2026-03-04T09:30:00".to_string(),
                sections: ClinicalSummarySections::default(),
            },
        ];
        let prompt = health_summary_prompt("P-100", &records);

        assert!(prompt.contains("clinical records for patient P-100"));
        assert_eq!(prompt.matches("Visit Date:").count(), 2);
        assert!(prompt.contains("Chief Complaint: Migraine"));
    }
}
