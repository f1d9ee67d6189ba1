//! Pulls patient replies out of the mailbox into patient folders.

use email_service::{EmailService, UNKNOWN_PATIENT};
use error_common::{Result, ScribeError};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};
use visit_store::{StoreError, VisitStore};

pub const PATIENT_INBOX_LIMIT: usize = 50;
pub const ALL_INBOX_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InboxSyncReport {
    pub total_fetched: usize,
    pub new_emails: usize,
    pub patients_updated: usize,
}

/// Fetch mail from one patient's address and file it under that patient.
///
/// Without `patient_email` the address is taken from earlier outbound mail.
pub async fn sync_patient_inbox(
    email: &EmailService,
    store: &VisitStore,
    patient_id: &str,
    patient_email: Option<&str>,
) -> Result<InboxSyncReport> {
    let address = match patient_email.map(str::trim).filter(|a| !a.is_empty()) {
        Some(address) => address.to_string(),
        None => store.find_patient_email(patient_id).await?.ok_or_else(|| {
            ScribeError::Validation(
                "Patient email not found. Please ensure an email was sent to this patient first."
                    .to_string(),
            )
        })?,
    };

    let fetched = email
        .fetch_inbox_emails(Some(&address), PATIENT_INBOX_LIMIT)
        .await?;

    let mut report = InboxSyncReport {
        total_fetched: fetched.len(),
        ..InboxSyncReport::default()
    };
    for message in &fetched {
        if store.save_inbox_email(patient_id, message).await? {
            report.new_emails = report.new_emails.saturating_add(1);
        }
    }
    if report.new_emails > 0 {
        report.patients_updated = 1;
    }

    info!(patient_id, new_emails = report.new_emails, "Patient inbox synced");
    Ok(report)
}

/// Fetch recent mail for everyone, filed by the `X-Patient-ID` header.
/// Messages without one are left in the mailbox.
pub async fn sync_all_inboxes(email: &EmailService, store: &VisitStore) -> Result<InboxSyncReport> {
    let fetched = email.fetch_inbox_emails(None, ALL_INBOX_LIMIT).await?;

    let mut report = InboxSyncReport {
        total_fetched: fetched.len(),
        ..InboxSyncReport::default()
    };
    let mut patients = BTreeSet::new();

    for message in fetched.iter().filter(|m| m.patient_id != UNKNOWN_PATIENT) {
        match store.save_inbox_email(&message.patient_id, message).await {
            Ok(true) => {
                report.new_emails = report.new_emails.saturating_add(1);
                patients.insert(message.patient_id.as_str());
            }
            Ok(false) => {}
            Err(StoreError::InvalidId(reason)) => {
                warn!(message_id = %message.id, reason = %reason, "Skipping email with unusable patient id");
            }
            Err(e) => return Err(e.into()),
        }
    }
    report.patients_updated = patients.len();

    info!(
        new_emails = report.new_emails,
        patients_updated = report.patients_updated,
        "Inbox synced"
    );
    Ok(report)
}
