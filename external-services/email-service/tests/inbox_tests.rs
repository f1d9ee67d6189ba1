use email_service::{DropFolderMailbox, MailboxSource, UNKNOWN_PATIENT};
use std::path::Path;
use tempfile::TempDir;

fn write_eml(dir: &Path, name: &str, from: &str, date: &str, patient: Option<&str>, body: &str) {
    let patient_header = patient
        .map(|id| format!("X-Patient-ID: {id}\r\n"))
        .unwrap_or_default();
    let raw = format!(
        "From: Patient <{from}>\r\n\
         To: clinic@example.com\r\n\
         Subject: Re: Visit Summary\r\n\
         Date: {date}\r\n\
         Message-ID: <{name}@mail.example.com>\r\n\
         In-Reply-To: <summary-1@clinic.example.com>\r\n\
         {patient_header}\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         {body}\r\n"
    );
    std::fs::write(dir.join(format!("{name}.eml")), raw).unwrap();
}

fn seeded_inbox() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_eml(
        dir.path(),
        "older",
        "jane@example.com",
        "Mon, 06 Jan 2025 09:00:00 +0000",
        Some("P-100"),
        "Thanks, the cough is better.\r\n\r\nOn Mon, Jan 6, 2025 Clinic wrote:\r\n> Visit summary",
    );
    write_eml(
        dir.path(),
        "newer",
        "jane@example.com",
        "Tue, 07 Jan 2025 09:00:00 +0000",
        Some("P-100"),
        "Still have a mild fever.",
    );
    write_eml(
        dir.path(),
        "other",
        "bob@example.org",
        "Wed, 08 Jan 2025 09:00:00 +0000",
        None,
        "Can I reschedule?",
    );
    std::fs::write(dir.path().join("notes.txt"), "not an email").unwrap();
    dir
}

#[tokio::test]
async fn fetch_sorts_newest_first_and_skips_non_eml() {
    let dir = seeded_inbox();
    let mailbox = DropFolderMailbox::new(dir.path());

    let emails = mailbox.fetch(None, 10).await.unwrap();

    let ids: Vec<&str> = emails.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["other@mail.example.com", "newer@mail.example.com", "older@mail.example.com"]
    );
}

#[tokio::test]
async fn fetch_filters_by_sender_case_insensitively() {
    let dir = seeded_inbox();
    let mailbox = DropFolderMailbox::new(dir.path());

    let emails = mailbox.fetch(Some("JANE@example.com"), 10).await.unwrap();

    assert_eq!(emails.len(), 2);
    assert!(emails.iter().all(|e| e.from == "jane@example.com"));
}

#[tokio::test]
async fn fetch_respects_limit() {
    let dir = seeded_inbox();
    let mailbox = DropFolderMailbox::new(dir.path());

    let emails = mailbox.fetch(None, 1).await.unwrap();

    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].from, "bob@example.org");
}

#[tokio::test]
async fn patient_header_and_reply_body_extracted() {
    let dir = seeded_inbox();
    let mailbox = DropFolderMailbox::new(dir.path());

    let emails = mailbox.fetch(Some("jane@example.com"), 10).await.unwrap();
    let older = emails.iter().find(|e| e.id == "older@mail.example.com").unwrap();

    assert_eq!(older.patient_id, "P-100");
    assert_eq!(older.body, "Thanks, the cough is better.");
    assert_eq!(older.in_reply_to, "summary-1@clinic.example.com");
    assert_eq!(older.subject, "Re: Visit Summary");
}

#[tokio::test]
async fn missing_patient_header_is_unknown() {
    let dir = seeded_inbox();
    let mailbox = DropFolderMailbox::new(dir.path());

    let emails = mailbox.fetch(Some("bob@"), 10).await.unwrap();

    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].patient_id, UNKNOWN_PATIENT);
}

#[tokio::test]
async fn missing_folder_is_empty_inbox() {
    let dir = TempDir::new().unwrap();
    let mailbox = DropFolderMailbox::new(dir.path().join("absent"));

    assert!(mailbox.fetch(None, 10).await.unwrap().is_empty());
}
