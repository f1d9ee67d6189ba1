//! Visit transcription for AIscribe
//!
//! Uploads a recorded encounter to a speech-to-text provider, polls until the
//! job reaches a terminal state and maps the provider's speaker labels onto
//! clinical roles.
//!
//! # Speaker roles
//!
//! - **Conversation mode** (diarized): the first speaker heard is the
//!   `Doctor`, every other speaker is the `Patient`.
//! - **Notes mode**: a single `Doctor Notes` entry holding the full text.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use transcription_service::{format_dialogue_text, TranscriptionConfig, TranscriptionService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = TranscriptionService::new(TranscriptionConfig::from_env()?)?;
//! let transcript = service.transcribe_audio(Path::new("visit.wav"), true).await?;
//!
//! println!("{}", format_dialogue_text(&transcript.dialogue));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod providers;
pub mod service;
pub mod transcription;

pub use config::*;
pub use error::*;
pub use service::*;
pub use providers::TranscriptionProvider;
pub use transcription::*;
