//! AIscribe command-line interface and visit pipeline
//!
//! The binary (`aiscribe`) drives the whole workflow from a terminal:
//!
//! - **Visits**: transcribe a recording, generate the clinical summary and
//!   MDM coding, email the patient, store everything per patient
//! - **Records**: list and delete processed recordings, build a longitudinal
//!   health summary from a patient's stored visits
//! - **Email**: list stored correspondence, reply to a patient, pull replies
//!   from the inbox into patient folders
//! - **Assistant**: ask the clinical/platform chat assistant a question
//! - **Accounts**: clinician sign-up and login
//!
//! # Example Usage
//!
//! ```bash
//! # Process a recorded visit and email the summary
//! aiscribe process visit.wav --patient-id P-1001 --email jane@example.com
//!
//! # Dictated notes, no email
//! aiscribe process notes.m4a --patient-id P-1001 --recording-type notes
//!
//! # Records
//! aiscribe recordings list
//! aiscribe recordings delete P-1001/20250106_091500
//! aiscribe health-summary P-1001
//!
//! # Correspondence
//! aiscribe emails list P-1001
//! aiscribe emails fetch --patient-id P-1001
//! aiscribe emails reply P-1001 --subject "Re: Visit Summary" --body "See you Friday"
//!
//! # Assistant
//! aiscribe chat "how do I upload a recording?"
//! ```

pub mod cli;
pub mod commands;
pub mod inbox;
pub mod pipeline;

pub use inbox::{sync_all_inboxes, sync_patient_inbox, InboxSyncReport, ALL_INBOX_LIMIT, PATIENT_INBOX_LIMIT};
pub use pipeline::{VisitOutcome, VisitPipeline, VisitRequest};
