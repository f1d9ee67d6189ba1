use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Clinical role attached to a dialogue line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeakerRole {
    Doctor,
    Patient,
    #[serde(rename = "Doctor Notes")]
    DoctorNotes,
}

impl SpeakerRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "Doctor",
            Self::Patient => "Patient",
            Self::DoctorNotes => "Doctor Notes",
        }
    }
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider utterance with its raw speaker label ("A", "B", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub speaker: SpeakerRole,
    pub text: String,
    pub confidence: Option<f32>,
}

/// Completed transcription of one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub full_text: String,
    pub dialogue: Vec<DialogueEntry>,
    pub confidence: Option<f32>,
    /// Audio length in seconds
    #[serde(rename = "duration")]
    pub duration_secs: Option<f64>,
    pub is_diarized: bool,
}

/// First speaker label seen becomes the doctor, every later label the patient.
pub fn assign_roles(utterances: &[Utterance]) -> Vec<DialogueEntry> {
    let mut roles: HashMap<&str, SpeakerRole> = HashMap::new();

    utterances
        .iter()
        .map(|utterance| {
            let next_role = if roles.is_empty() {
                SpeakerRole::Doctor
            } else {
                SpeakerRole::Patient
            };
            let speaker = *roles.entry(utterance.speaker.as_str()).or_insert(next_role);

            DialogueEntry {
                speaker,
                text: utterance.text.clone(),
                confidence: utterance.confidence,
            }
        })
        .collect()
}

/// Single entry holding the whole text, for dictated notes.
pub fn notes_dialogue(full_text: &str, confidence: Option<f32>) -> Vec<DialogueEntry> {
    vec![DialogueEntry {
        speaker: SpeakerRole::DoctorNotes,
        text: full_text.to_string(),
        confidence,
    }]
}

/// `"doctor: ..."` lines joined by newlines, the conversation text fed to the models.
pub fn format_dialogue_text(dialogue: &[DialogueEntry]) -> String {
    dialogue
        .iter()
        .map(|entry| format!("{}: {}", entry.speaker.as_str().to_lowercase(), entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(speaker: &str, text: &str) -> Utterance {
        Utterance {
            speaker: speaker.to_string(),
            text: text.to_string(),
            confidence: Some(0.9),
        }
    }

    #[test]
    fn test_first_speaker_is_doctor() {
        let dialogue = assign_roles(&[
            utterance("B", "What brings you in today?"),
            utterance("A", "I have had a cough for a week."),
            utterance("B", "Any fever?"),
            utterance("C", "He had a fever last night."),
        ]);

        let roles: Vec<SpeakerRole> = dialogue.iter().map(|e| e.speaker).collect();
        assert_eq!(
            roles,
            vec![
                SpeakerRole::Doctor,
                SpeakerRole::Patient,
                SpeakerRole::Doctor,
                SpeakerRole::Patient
            ]
        );
    }

    #[test]
    fn test_no_utterances() {
        assert!(assign_roles(&[]).is_empty());
        assert_eq!(format_dialogue_text(&[]), "");
    }

    #[test]
    fn test_format_dialogue_text() {
        let dialogue = assign_roles(&[utterance("A", "Hello."), utterance("B", "Hi doctor.")]);
        assert_eq!(format_dialogue_text(&dialogue), "doctor: Hello.\npatient: Hi doctor.");

        let notes = notes_dialogue("Patient stable.", None);
        assert_eq!(format_dialogue_text(&notes), "doctor notes: Patient stable.");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&SpeakerRole::DoctorNotes).unwrap();
        assert_eq!(json, "\"Doctor Notes\"");
    }
}
