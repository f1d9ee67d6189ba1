//! Common error handling utilities for AIscribe
//!
//! Every service crate keeps its own `thiserror` enum. This crate provides the
//! workspace-wide [`ScribeError`] those enums convert into at the pipeline
//! boundary, the stable error codes reported to callers, and an
//! [`ErrorContext`] that carries request identifiers into log lines.
//!
//! # Error Categories
//!
//! - **Validation**: bad input (unsupported audio type, missing patient id)
//! - **Authentication**: signup/login failures
//! - **Transcription**: speech-to-text provider failures
//! - **AiGeneration**: every model attempt in the escalation plan failed
//! - **Email**: SMTP delivery or inbox retrieval failures
//! - **Storage**: visit results and email records on disk
//! - **Configuration**: missing or malformed environment settings
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, ErrorContext, ScribeError};
//!
//! let err = ScribeError::Validation("patient id is required".to_string());
//! assert_eq!(err.code(), codes::validation::MISSING_REQUIRED_FIELD);
//!
//! let ctx = ErrorContext::new()
//!     .with_request_id("req-1".to_string())
//!     .add_context("step", "upload");
//! assert_eq!(ctx.additional.get("step").map(String::as_str), Some("upload"));
//! ```

pub mod codes;
pub mod context;
pub mod types;

pub use context::*;
pub use types::*;
