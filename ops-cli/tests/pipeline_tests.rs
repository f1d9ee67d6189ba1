use aiscribe_cli::{sync_all_inboxes, sync_patient_inbox, VisitPipeline, VisitRequest};
use async_trait::async_trait;
use clinical_ai::{
    AiErrorKind, AttemptResult, ClinicalAiService, Credential, EscalationPlan, ModelEndpoint,
};
use email_service::{
    DropFolderMailbox, EmailConfig, EmailError, EmailResult, EmailService, MailTransport,
    OutgoingEmail,
};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use transcription_service::{
    DialogueEntry, SpeakerRole, Transcript, TranscriptionError, TranscriptionProvider,
    TranscriptionResult, TranscriptionService,
};
use visit_store::{EmailDirection, RecordingType, StoreConfig, VisitStore};

const SUMMARY: &str = "CHIEF_COMPLAINT:\nPersistent cough\n\nHISTORY_OF_PRESENT_ILLNESS:\nThree days of dry cough.\n\nASSESSMENT_PLAN:\nViral URI. Rest and fluids.";

struct FakeTranscriber {
    fail: bool,
}

#[async_trait]
impl TranscriptionProvider for FakeTranscriber {
    async fn transcribe(&self, audio_path: &Path, diarize: bool) -> TranscriptionResult<Transcript> {
        assert!(audio_path.exists(), "pipeline must transcribe the stored copy");
        if self.fail {
            return Err(TranscriptionError::Failed("audio too short".to_string()));
        }
        Ok(Transcript {
            full_text: "What brings you in? I have a cough.".to_string(),
            dialogue: vec![
                DialogueEntry {
                    speaker: SpeakerRole::Doctor,
                    text: "What brings you in?".to_string(),
                    confidence: Some(0.95),
                },
                DialogueEntry {
                    speaker: SpeakerRole::Patient,
                    text: "I have a cough.".to_string(),
                    confidence: Some(0.93),
                },
            ],
            confidence: Some(0.94),
            duration_secs: Some(4.0),
            is_diarized: diarize,
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Answers the clinical summary prompt; MDM prompts succeed or fail per `mdm_fails`.
struct ScriptedModel {
    mdm_fails: bool,
    summary_fails: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(summary_fails: bool, mdm_fails: bool) -> Self {
        Self {
            mdm_fails,
            summary_fails,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelEndpoint for ScriptedModel {
    async fn invoke(
        &self,
        prompt: &str,
        model_id: &str,
        credential: &Credential,
        _max_output_tokens: Option<u32>,
    ) -> AttemptResult {
        let is_mdm = prompt.contains("Medical Decision Making (MDM) analysis");
        self.calls
            .lock()
            .unwrap()
            .push(if is_mdm { "mdm" } else { "summary" }.to_string());

        let fails = if is_mdm { self.mdm_fails } else { self.summary_fails };
        if fails {
            AttemptResult::failure(AiErrorKind::Server, "HTTP 503", model_id, credential.label())
        } else if is_mdm {
            AttemptResult::success("MDM Level: Low\nICD-10: J06.9", model_id, credential.label())
        } else {
            AttemptResult::success(SUMMARY, model_id, credential.label())
        }
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> EmailResult<()> {
        if self.fail {
            return Err(EmailError::SendFailed("SMTP connection failed".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

fn plan() -> EscalationPlan {
    EscalationPlan::new(
        "test/primary",
        "test/fallback",
        Arc::new(Credential::new("Primary API", "key-a")),
        Arc::new(Credential::new("Backup API", "key-b")),
    )
}

fn email_config(inbox: PathBuf) -> EmailConfig {
    EmailConfig {
        smtp_server: "smtp.example.com".to_string(),
        smtp_port: 587,
        username: "clinic@example.com".to_string(),
        password: SecretString::new("secret".to_string()),
        from_name: "AIscribe Medical Team".to_string(),
        email_enabled: true,
        imap_server: "imap.example.com".to_string(),
        imap_port: 993,
        inbox_dir: Some(inbox),
    }
}

struct Harness {
    dir: TempDir,
    audio: PathBuf,
    model: Arc<ScriptedModel>,
    transport: Arc<RecordingTransport>,
}

impl Harness {
    fn new(model: ScriptedModel, transport: RecordingTransport) -> Self {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("visit.wav");
        std::fs::write(&audio, b"RIFF....WAVE").unwrap();
        Self {
            dir,
            audio,
            model: Arc::new(model),
            transport: Arc::new(transport),
        }
    }

    fn store(&self) -> VisitStore {
        VisitStore::new(StoreConfig::default().with_upload_folder(self.dir.path().join("uploads")))
    }

    fn email(&self) -> EmailService {
        let inbox = self.dir.path().join("inbox");
        EmailService::with_backends(
            email_config(inbox.clone()),
            self.transport.clone(),
            Arc::new(DropFolderMailbox::new(inbox)),
        )
    }

    fn pipeline(&self, transcription_fails: bool) -> VisitPipeline {
        VisitPipeline::new(
            TranscriptionService::with_provider(Box::new(FakeTranscriber {
                fail: transcription_fails,
            })),
            ClinicalAiService::with_endpoint(self.model.clone(), plan()),
            self.email(),
            self.store(),
        )
    }

    fn request(&self, email: Option<&str>) -> VisitRequest {
        VisitRequest {
            audio_path: self.audio.clone(),
            patient_id: "P-1001".to_string(),
            patient_email: email.map(str::to_string),
            recording_type: RecordingType::Conversation,
        }
    }
}

#[tokio::test]
async fn full_visit_is_documented_emailed_and_stored() {
    let harness = Harness::new(ScriptedModel::new(false, false), RecordingTransport::default());

    let outcome = harness
        .pipeline(false)
        .process(harness.request(Some("jane@example.com")))
        .await
        .unwrap();

    let summary = &outcome.results.clinical_summary;
    assert_eq!(summary.sections.chief_complaint, "Persistent cough");
    assert_eq!(summary.model_used, "test/primary (Primary API)");
    assert_eq!(
        outcome.results.conversation_text,
        "doctor: What brings you in?\npatient: I have a cough."
    );
    assert!(outcome.results.mdm_summary.is_some());

    let sent = harness.transport.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@example.com");
    assert_eq!(sent[0].patient_id, "P-1001");
    assert_eq!(sent[0].subject, "Visit Summary - Persistent cough");
    assert!(outcome.email.sent);

    let store = harness.store();
    let recordings = store.list_recordings().await.unwrap();
    assert_eq!(recordings.len(), 1);
    assert_eq!(recordings[0].recording_id, outcome.recording_id);
    assert_eq!(
        store.find_patient_email("P-1001").await.unwrap().as_deref(),
        Some("jane@example.com")
    );

    assert_eq!(*harness.model.calls.lock().unwrap(), vec!["summary", "mdm"]);
}

#[tokio::test]
async fn mdm_failure_keeps_clinical_summary() {
    let harness = Harness::new(ScriptedModel::new(false, true), RecordingTransport::default());

    let outcome = harness
        .pipeline(false)
        .process(harness.request(Some("jane@example.com")))
        .await
        .unwrap();

    assert_eq!(outcome.results.clinical_summary.sections.chief_complaint, "Persistent cough");
    assert!(outcome.results.mdm_summary.is_none());
    assert!(outcome.results.mdm_error.as_deref().unwrap().contains("HTTP 503"));
    assert!(outcome.email.sent);

    // one summary call, then four MDM attempts
    assert_eq!(harness.model.calls.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn summary_failure_aborts_before_email() {
    let harness = Harness::new(ScriptedModel::new(true, false), RecordingTransport::default());

    let err = harness
        .pipeline(false)
        .process(harness.request(Some("jane@example.com")))
        .await
        .unwrap_err();

    assert_eq!(err.code(), error_common::codes::ai::ESCALATION_EXHAUSTED);
    assert!(harness.transport.sent.lock().unwrap().is_empty());
    assert!(harness.store().list_recordings().await.unwrap().is_empty());
}

#[tokio::test]
async fn transcription_failure_is_reported() {
    let harness = Harness::new(ScriptedModel::new(false, false), RecordingTransport::default());

    let err = harness
        .pipeline(true)
        .process(harness.request(None))
        .await
        .unwrap_err();

    assert_eq!(err.code(), error_common::codes::transcription::PROVIDER_FAILED);
    assert!(harness.model.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn no_address_means_no_send() {
    let harness = Harness::new(ScriptedModel::new(false, false), RecordingTransport::default());

    let outcome = harness
        .pipeline(false)
        .process(harness.request(Some("   ")))
        .await
        .unwrap();

    assert!(!outcome.email.sent);
    assert_eq!(outcome.email.to, "P-1001@patient.email");
    assert!(outcome.email.send_error.is_none());
    assert!(harness.transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_failure_is_recorded_not_fatal() {
    let transport = RecordingTransport {
        fail: true,
        ..RecordingTransport::default()
    };
    let harness = Harness::new(ScriptedModel::new(false, false), transport);

    let outcome = harness
        .pipeline(false)
        .process(harness.request(Some("jane@example.com")))
        .await
        .unwrap();

    assert!(!outcome.email.sent);
    assert!(outcome
        .email
        .send_error
        .as_deref()
        .unwrap()
        .contains("SMTP connection failed"));
    assert_eq!(harness.store().list_emails("P-1001").await.unwrap().len(), 1);
}

#[tokio::test]
async fn unsupported_audio_is_rejected_up_front() {
    let harness = Harness::new(ScriptedModel::new(false, false), RecordingTransport::default());
    let text = harness.dir.path().join("notes.txt");
    std::fs::write(&text, b"not audio").unwrap();
    let mut request = harness.request(None);
    request.audio_path = text;

    let err = harness.pipeline(false).process(request).await.unwrap_err();

    assert_eq!(err.code(), error_common::codes::validation::UNSUPPORTED_FILE_TYPE);
    assert!(harness.model.calls.lock().unwrap().is_empty());
}

fn write_reply(inbox: &Path, name: &str, from: &str, patient: &str) {
    std::fs::create_dir_all(inbox).unwrap();
    let raw = format!(
        "From: <{from}>\r\nTo: clinic@example.com\r\nSubject: Re: Visit Summary\r\n\
         Date: Tue, 07 Jan 2025 09:00:00 +0000\r\nMessage-ID: <{name}@mail.example.com>\r\n\
         X-Patient-ID: {patient}\r\nContent-Type: text/plain\r\n\r\nFeeling better, thanks.\r\n"
    );
    std::fs::write(inbox.join(format!("{name}.eml")), raw).unwrap();
}

#[tokio::test]
async fn patient_inbox_sync_uses_previous_address() {
    let harness = Harness::new(ScriptedModel::new(false, false), RecordingTransport::default());
    harness
        .pipeline(false)
        .process(harness.request(Some("jane@example.com")))
        .await
        .unwrap();
    let inbox = harness.dir.path().join("inbox");
    write_reply(&inbox, "r1", "jane@example.com", "P-1001");
    write_reply(&inbox, "r2", "bob@example.com", "P-2002");

    let email = harness.email();
    let store = harness.store();
    let first = sync_patient_inbox(&email, &store, "P-1001", None).await.unwrap();
    let second = sync_patient_inbox(&email, &store, "P-1001", None).await.unwrap();

    assert_eq!(first.total_fetched, 1);
    assert_eq!(first.new_emails, 1);
    assert_eq!(second.new_emails, 0);

    let emails = store.list_emails("P-1001").await.unwrap();
    assert!(emails
        .iter()
        .any(|e| e.direction == EmailDirection::Inbound && e.body == "Feeling better, thanks."));
}

#[tokio::test]
async fn patient_inbox_sync_needs_an_address() {
    let harness = Harness::new(ScriptedModel::new(false, false), RecordingTransport::default());

    let err = sync_patient_inbox(&harness.email(), &harness.store(), "P-404", None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), error_common::codes::validation::INVALID_INPUT);
}

#[tokio::test]
async fn all_inbox_sync_files_by_patient_header() {
    let harness = Harness::new(ScriptedModel::new(false, false), RecordingTransport::default());
    let inbox = harness.dir.path().join("inbox");
    write_reply(&inbox, "a", "jane@example.com", "P-1001");
    write_reply(&inbox, "b", "bob@example.com", "P-2002");
    write_reply(&inbox, "c", "eve@example.com", "unknown");

    let report = sync_all_inboxes(&harness.email(), &harness.store()).await.unwrap();

    assert_eq!(report.total_fetched, 3);
    assert_eq!(report.new_emails, 2);
    assert_eq!(report.patients_updated, 2);
    assert_eq!(harness.store().list_emails("P-2002").await.unwrap().len(), 1);
}
