//! Patient email for AIscribe, built on Stalwart Labs' mail libraries
//!
//! - **Compose**: turns a parsed clinical summary into the patient-facing
//!   visit summary (subject plus HTML body)
//! - **Send**: SMTP with STARTTLS via `mail-send`, messages built with
//!   `mail-builder` and tagged with `X-Patient-ID`/`X-AIscribe-Type` headers
//! - **Receive**: patient replies fetched over IMAP (`async-imap` on
//!   tokio-rustls) with a `FROM` search, or read from a drop folder of `.eml`
//!   files, parsed with `mail-parser`, quoted history stripped
//!
//! Addresses are passed through the log redactor before being logged.

pub mod compose;
pub mod config;
pub mod error;
pub mod imap;
pub mod inbox;
pub mod reply;
pub mod service;
pub mod transport;

pub use compose::*;
pub use config::*;
pub use error::*;
pub use imap::ImapMailbox;
pub use inbox::*;
pub use reply::extract_reply_content;
pub use service::*;
pub use transport::*;

pub const PATIENT_ID_HEADER: &str = "X-Patient-ID";
pub const AISCRIBE_TYPE_HEADER: &str = "X-AIscribe-Type";
pub const VISIT_SUMMARY_TYPE: &str = "visit-summary";
