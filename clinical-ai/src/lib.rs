//! Clinical AI generation for AIscribe
//!
//! Every language-model feature (clinical summary, medical decision making,
//! patient health summary, chat assistant) is funnelled through one
//! [`FallbackOrchestrator`]: a fixed four step escalation over two models and
//! two API credentials. The free-form model output of the clinical summary is
//! split into sections by literal markers in [`parser`], and chat questions are
//! routed to a platform or medical prompt by [`categorizer`]. Questions with an
//! attached image skip the escalation and go to the vision model, trying each
//! credential once.
//!
//! ```text
//! ClinicalAiService ──► prompts ──► FallbackOrchestrator ──► ModelEndpoint (x4 max)
//!        ▲                                   │
//!        └──── parser / categorizer ◄────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use clinical_ai::{AiConfig, ClinicalAiService};
//!
//! # async fn run() -> Result<(), clinical_ai::AiError> {
//! let service = ClinicalAiService::new(&AiConfig::from_env()?)?;
//! let summary = service
//!     .generate_clinical_summary("doctor: what brings you in?\npatient: a cough")
//!     .await?;
//! println!("{}", summary.sections.chief_complaint);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod attempt;
pub mod categorizer;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod service;

pub use adapter::{ModelEndpoint, OpenRouterEndpoint};
pub use attempt::{AttemptResult, Outcome};
pub use categorizer::{categorize, CategoryDecision};
pub use config::{AiConfig, Credential};
pub use error::{AiError, AiErrorKind, AiResult};
pub use models::*;
pub use orchestrator::{EscalationPlan, FallbackOrchestrator, PlanEntry};
pub use parser::{parse_clinical_sections, ClinicalSummarySections, MarkerSectionParser, SectionParser};
pub use service::ClinicalAiService;
