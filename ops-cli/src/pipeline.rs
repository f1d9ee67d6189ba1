use clinical_ai::ClinicalAiService;
use email_service::{compose_visit_email, EmailError, EmailService};
use error_common::{log_error, ErrorContext, Result, ScribeError};
use logger_redacted::redacted_info;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use transcription_service::{format_dialogue_text, TranscriptionService};
use visit_store::{
    sanitize_patient_id, EmailRecord, RecordingId, RecordingType, VisitResults, VisitStore,
};

/// Address recorded on the email file when no patient address was given
const PLACEHOLDER_DOMAIN: &str = "patient.email";

#[derive(Debug, Clone)]
pub struct VisitRequest {
    pub audio_path: PathBuf,
    pub patient_id: String,
    pub patient_email: Option<String>,
    pub recording_type: RecordingType,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitOutcome {
    pub recording_id: String,
    pub results: VisitResults,
    pub email: EmailRecord,
}

/// Audio in, documented visit out:
/// store audio → transcribe → clinical summary → MDM → compose/send email → store results.
pub struct VisitPipeline {
    transcription: TranscriptionService,
    ai: ClinicalAiService,
    email: EmailService,
    store: VisitStore,
}

impl VisitPipeline {
    pub fn new(
        transcription: TranscriptionService,
        ai: ClinicalAiService,
        email: EmailService,
        store: VisitStore,
    ) -> Self {
        Self {
            transcription,
            ai,
            email,
            store,
        }
    }

    pub async fn process(&self, request: VisitRequest) -> Result<VisitOutcome> {
        let context = ErrorContext::for_operation("process_visit")
            .with_patient_id(request.patient_id.clone())
            .add_context("recording_type", request.recording_type.as_str());

        let outcome = self.run(request).await;
        if let Err(err) = &outcome {
            log_error(&context, err);
        }
        outcome
    }

    async fn run(&self, request: VisitRequest) -> Result<VisitOutcome> {
        let patient_id = request.patient_id.trim();
        if patient_id.is_empty() {
            return Err(ScribeError::Validation("patient_id is required".to_string()));
        }
        let patient_email = request
            .patient_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty());

        info!(patient_id, recording_type = %request.recording_type, "Processing visit");

        let saved = self.store.save_audio(patient_id, &request.audio_path).await?;

        info!(patient_id, "Step 1: transcription");
        let transcript = self
            .transcription
            .transcribe_audio(&saved.path, request.recording_type.diarize())
            .await?;
        let mut conversation_text = format_dialogue_text(&transcript.dialogue);
        if conversation_text.trim().is_empty() {
            conversation_text = transcript.full_text.clone();
        }
        if conversation_text.trim().is_empty() {
            return Err(ScribeError::Transcription(
                "Transcription produced no text".to_string(),
            ));
        }

        info!(patient_id, "Step 2: clinical summary");
        let clinical_summary = self.ai.generate_clinical_summary(&conversation_text).await?;

        info!(patient_id, "Step 3: medical decision making");
        let (mdm_summary, mdm_error) = match self
            .ai
            .generate_medical_decision_making(&conversation_text, &clinical_summary.sections)
            .await
        {
            Ok(mdm) => (Some(mdm), None),
            Err(e) => {
                warn!(patient_id, error = %e, "MDM generation failed, keeping clinical summary");
                (None, Some(e.to_string()))
            }
        };

        info!(patient_id, "Step 4: patient email");
        let composed = compose_visit_email(&clinical_summary.sections);
        let to = patient_email.map_or_else(
            || format!("{patient_id}@{PLACEHOLDER_DOMAIN}"),
            str::to_string,
        );
        let mut email_record = EmailRecord::outbound(patient_id, &to, &composed.subject, &composed.body);

        if let Some(address) = patient_email {
            match self
                .email
                .send_email(address, &composed.subject, &composed.body, patient_id)
                .await
            {
                Ok(receipt) => {
                    redacted_info!("Visit summary emailed to {}", address);
                    email_record.mark_sent(receipt.sent_at);
                }
                Err(e) => {
                    if !matches!(e, EmailError::Disabled) {
                        warn!(patient_id, error = %logger_redacted::redact(&e.to_string()), "Email sending failed");
                    }
                    email_record.mark_failed(e.to_string());
                }
            }
        } else {
            info!(patient_id, "No patient email provided, email not sent");
        }

        let results = VisitResults {
            timestamp: chrono::Local::now().to_rfc3339(),
            filename: saved.filename.clone(),
            patient_id: patient_id.to_string(),
            recording_type: request.recording_type,
            transcription: transcript,
            conversation_text,
            clinical_summary,
            mdm_summary,
            mdm_error,
        };

        self.store
            .save_email_record(&saved.timestamp, &email_record, false)
            .await?;
        self.store.save_results(&saved.timestamp, &results).await?;

        let folder = sanitize_patient_id(patient_id)?;
        let recording_id = RecordingId::new(folder, saved.timestamp.as_str()).to_string();
        info!(recording_id = %recording_id, email_sent = email_record.sent, "Visit processed");

        Ok(VisitOutcome {
            recording_id,
            results,
            email: email_record,
        })
    }
}
