//! File-backed storage for AIscribe visits
//!
//! Every patient gets a folder under the upload root. A processed visit
//! leaves three kinds of files there, all sharing the `YYYYMMDD_HHMMSS`
//! timestamp of the upload:
//!
//! ```text
//! uploads/
//!   P-1001/
//!     20250106_091500_visit.wav       original audio
//!     20250106_091500_results.json    transcript, clinical summary, MDM
//!     20250106_091500_email.json      patient email as composed/sent
//!     20250107_101010_reply_email.json
//!     inbox_3f9a0c1d2e4b5a69_email.json
//! ```
//!
//! A recording is addressed as `{patient_id}/{timestamp}`.

pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use config::*;
pub use error::*;
pub use models::*;
pub use store::*;
