use clinical_ai::{ClinicalSummary, ClinicalSummarySections, MdmSummary};
use email_service::InboxEmail;
use tempfile::TempDir;
use transcription_service::{DialogueEntry, SpeakerRole, Transcript};
use visit_store::{
    EmailDirection, EmailRecord, RecordingId, RecordingType, StoreConfig, StoreError, VisitResults,
    VisitStore,
};

fn store(dir: &TempDir) -> VisitStore {
    VisitStore::new(StoreConfig::default().with_upload_folder(dir.path()))
}

fn results(patient_id: &str, timestamp: &str, complaint: &str) -> VisitResults {
    VisitResults {
        timestamp: timestamp.to_string(),
        filename: "visit.wav".to_string(),
        patient_id: patient_id.to_string(),
        recording_type: RecordingType::Conversation,
        transcription: Transcript {
            full_text: "What brings you in? A cough.".to_string(),
            dialogue: vec![DialogueEntry {
                speaker: SpeakerRole::Doctor,
                text: "What brings you in?".to_string(),
                confidence: Some(0.9),
            }],
            confidence: Some(0.9),
            duration_secs: Some(12.5),
            is_diarized: true,
        },
        conversation_text: "doctor: What brings you in?".to_string(),
        clinical_summary: ClinicalSummary {
            sections: ClinicalSummarySections {
                chief_complaint: complaint.to_string(),
                history_of_present_illness: "Three days".to_string(),
                assessment_plan: "Rest".to_string(),
            },
            model_used: "test/primary (Primary API)".to_string(),
            raw_response: String::new(),
        },
        mdm_summary: Some(MdmSummary {
            mdm_summary: "Low complexity".to_string(),
            model_used: "test/primary (Primary API)".to_string(),
        }),
        mdm_error: None,
    }
}

fn inbox_email(id: &str, timestamp: &str) -> InboxEmail {
    InboxEmail {
        id: id.to_string(),
        from: "jane@example.com".to_string(),
        to: "clinic@example.com".to_string(),
        subject: "Re: Visit Summary".to_string(),
        body: "Feeling better".to_string(),
        timestamp: timestamp.to_string(),
        patient_id: "P-1".to_string(),
        in_reply_to: "summary@clinic".to_string(),
    }
}

#[tokio::test]
async fn save_audio_rejects_unsupported_type() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(&source, b"text").unwrap();

    let err = store(&dir).save_audio("P-1", &source).await.unwrap_err();

    assert!(matches!(err, StoreError::UnsupportedFileType(_)));
}

#[tokio::test]
async fn save_audio_rejects_oversized_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("visit.wav");
    std::fs::write(&source, vec![0u8; 64]).unwrap();
    let mut config = StoreConfig::default().with_upload_folder(dir.path().join("uploads"));
    config.max_file_size = 10;

    let err = VisitStore::new(config).save_audio("P-1", &source).await.unwrap_err();

    assert!(matches!(err, StoreError::FileTooLarge { size: 64, max: 10 }));
}

#[tokio::test]
async fn save_audio_prefixes_timestamp() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("my visit.wav");
    std::fs::write(&source, b"RIFF").unwrap();
    let store = VisitStore::new(StoreConfig::default().with_upload_folder(dir.path().join("uploads")));

    let saved = store.save_audio("P 1", &source).await.unwrap();

    assert_eq!(saved.filename, "my_visit.wav");
    assert_eq!(
        saved.path,
        dir.path()
            .join("uploads")
            .join("P_1")
            .join(format!("{}_my_visit.wav", saved.timestamp))
    );
    assert_eq!(std::fs::read(&saved.path).unwrap(), b"RIFF");
}

#[tokio::test]
async fn recordings_listed_newest_first_and_deleted() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    store
        .save_results("20250106_091500", &results("P-1", "2025-01-06T09:15:00+00:00", "Cough"))
        .await
        .unwrap();
    store
        .save_results("20250210_140000", &results("P-2", "2025-02-10T14:00:00+00:00", "Rash"))
        .await
        .unwrap();
    std::fs::write(dir.path().join("P-1").join("20250106_091500_visit.wav"), b"RIFF").unwrap();
    let email = EmailRecord::outbound("P-1", "jane@example.com", "Visit Summary - Cough", "<p>hi</p>");
    store.save_email_record("20250106_091500", &email, false).await.unwrap();

    let recordings = store.list_recordings().await.unwrap();
    let ids: Vec<&str> = recordings.iter().map(|r| r.recording_id.as_str()).collect();
    assert_eq!(ids, vec!["P-2/20250210_140000", "P-1/20250106_091500"]);
    assert_eq!(recordings[1].chief_complaint, "Cough");

    let id: RecordingId = "P-1/20250106_091500".parse().unwrap();
    assert_eq!(store.delete_recording(&id).await.unwrap(), 2);
    assert!(matches!(store.load_results(&id).await, Err(StoreError::NotFound(_))));
    assert_eq!(store.list_emails("P-1").await.unwrap().len(), 1);

    assert!(matches!(
        store.delete_recording(&id).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn unreadable_results_are_skipped() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store
        .save_results("20250106_091500", &results("P-1", "2025-01-06T09:15:00+00:00", "Cough"))
        .await
        .unwrap();
    std::fs::write(dir.path().join("P-1").join("20250107_000000_results.json"), b"{not json").unwrap();

    assert_eq!(store.list_recordings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn emails_sorted_and_patient_address_found() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let mut first = EmailRecord::outbound("P-1", "jane@example.com", "Visit Summary", "<p>a</p>");
    first.timestamp = "2025-01-06T09:15:00+00:00".to_string();
    first.mark_sent("2025-01-06T09:15:01+00:00".to_string());
    store.save_email_record("20250106_091500", &first, false).await.unwrap();

    let mut reply = EmailRecord::outbound("P-1", "jane@example.com", "Re: Visit", "<p>b</p>")
        .with_in_reply_to(Some("abc@mail.example.com"));
    reply.timestamp = "2025-01-08T10:00:00+00:00".to_string();
    store.save_email_record("20250108_100000", &reply, true).await.unwrap();

    assert!(store
        .save_inbox_email("P-1", &inbox_email("abc@mail.example.com", "2025-01-07T09:00:00+00:00"))
        .await
        .unwrap());

    let emails = store.list_emails("P-1").await.unwrap();
    let directions: Vec<EmailDirection> = emails.iter().map(|e| e.direction).collect();
    assert_eq!(
        directions,
        vec![EmailDirection::Outbound, EmailDirection::Inbound, EmailDirection::Outbound]
    );
    assert_eq!(emails[0].in_reply_to.as_deref(), Some("abc@mail.example.com"));
    assert!(dir.path().join("P-1").join("20250108_100000_reply_email.json").exists());

    assert_eq!(
        store.find_patient_email("P-1").await.unwrap().as_deref(),
        Some("jane@example.com")
    );
    assert_eq!(store.find_patient_email("P-9").await.unwrap(), None);
}

#[tokio::test]
async fn inbox_email_saved_once() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let email = inbox_email("dup@mail.example.com", "2025-01-07T09:00:00+00:00");

    assert!(store.save_inbox_email("P-1", &email).await.unwrap());
    assert!(!store.save_inbox_email("P-1", &email).await.unwrap());
    assert_eq!(store.list_emails("P-1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn clinical_records_collected_oldest_first() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store
        .save_results("20250210_140000", &results("P-1", "2025-02-10T14:00:00+00:00", "Rash"))
        .await
        .unwrap();
    store
        .save_results("20250106_091500", &results("P-1", "2025-01-06T09:15:00+00:00", "Cough"))
        .await
        .unwrap();
    store
        .save_results("20250301_080000", &results("P-1", "2025-03-01T08:00:00+00:00", ""))
        .await
        .unwrap();

    let records = store.collect_clinical_records("P-1").await.unwrap();

    let complaints: Vec<&str> = records
        .iter()
        .map(|r| r.sections.chief_complaint.as_str())
        .collect();
    assert_eq!(complaints, vec!["Cough", "Rash", ""]);
    assert_eq!(records[0].visit_date, "2025-01-06T09:15:00+00:00");
}

#[tokio::test]
async fn clinical_records_for_unknown_patient() {
    let dir = TempDir::new().unwrap();

    let err = store(&dir).collect_clinical_records("P-404").await.unwrap_err();

    assert!(matches!(err, StoreError::NotFound(_)));
}
