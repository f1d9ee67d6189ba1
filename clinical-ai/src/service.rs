use std::sync::Arc;
use tracing::{info, warn};

use crate::adapter::{ModelEndpoint, OpenRouterEndpoint};
use crate::categorizer::{categorize, term_counts, CategoryDecision};
use crate::config::{AiConfig, Credential, DEFAULT_VISION_MODEL};
use crate::error::{AiError, AiErrorKind, AiResult};
use crate::models::{
    ChatReply, ClinicalRecord, ClinicalSummary, HealthSummary, ImageAttachment, MdmSummary,
};
use crate::orchestrator::{EscalationPlan, FallbackOrchestrator};
use crate::parser::{ClinicalSummarySections, MarkerSectionParser, SectionParser};
use crate::prompts;

pub const HEALTH_SUMMARY_MAX_TOKENS: u32 = 800;
pub const CHAT_MAX_TOKENS: u32 = 400;
pub const VISION_MAX_TOKENS: u32 = 600;
pub const HEALTH_SUMMARY_BRAND: &str = "Clinical AI";

/// Clinical documentation generation on top of the fallback orchestrator
pub struct ClinicalAiService {
    orchestrator: FallbackOrchestrator,
    parser: Box<dyn SectionParser>,
    endpoint: Arc<dyn ModelEndpoint>,
    vision_model: String,
    vision_credentials: Vec<Arc<Credential>>,
}

impl ClinicalAiService {
    /// Service talking to OpenRouter with the configured models and keys.
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let endpoint = OpenRouterEndpoint::new(config)?;
        Ok(Self::with_endpoint(
            Arc::new(endpoint),
            EscalationPlan::from_config(config),
        )
        .with_vision_model(config.vision_model.clone()))
    }

    pub fn with_endpoint(endpoint: Arc<dyn ModelEndpoint>, plan: EscalationPlan) -> Self {
        Self {
            vision_credentials: plan.credentials(),
            orchestrator: FallbackOrchestrator::new(Arc::clone(&endpoint), plan),
            parser: Box::new(MarkerSectionParser),
            endpoint,
            vision_model: DEFAULT_VISION_MODEL.to_string(),
        }
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Replace the marker parser, e.g. with a schema-constrained one.
    pub fn with_parser(mut self, parser: Box<dyn SectionParser>) -> Self {
        self.parser = parser;
        self
    }

    pub async fn generate_clinical_summary(&self, conversation: &str) -> AiResult<ClinicalSummary> {
        require_text(conversation, "conversation")?;
        info!(conversation_chars = conversation.len(), "Generating clinical summary");

        let prompt = prompts::clinical_summary_prompt(conversation);
        let (raw_response, model_used) = self
            .orchestrator
            .run(&prompt, "Clinical Summary")
            .await
            .into_completion()?;

        let sections = self.parser.parse(&raw_response);
        if sections.is_empty() {
            warn!(model_used = %model_used, "Clinical summary had no section markers");
        }

        Ok(ClinicalSummary {
            sections,
            model_used,
            raw_response,
        })
    }

    pub async fn generate_medical_decision_making(
        &self,
        conversation: &str,
        summary: &ClinicalSummarySections,
    ) -> AiResult<MdmSummary> {
        require_text(conversation, "conversation")?;
        info!("Generating medical decision making summary");

        let prompt = prompts::medical_decision_making_prompt(conversation, summary);
        let (mdm_summary, model_used) = self
            .orchestrator
            .run(&prompt, "Medical Decision Making")
            .await
            .into_completion()?;

        Ok(MdmSummary {
            mdm_summary,
            model_used,
        })
    }

    /// Longitudinal summary over every stored visit of a patient.
    pub async fn generate_health_summary(
        &self,
        patient_id: &str,
        records: &[ClinicalRecord],
    ) -> AiResult<HealthSummary> {
        if records.is_empty() {
            return Err(AiError::NoRecords(patient_id.to_string()));
        }
        info!(patient_id = %patient_id, visits = records.len(), "Generating health summary");

        let prompt = prompts::health_summary_prompt(patient_id, records);
        let attempt = self
            .orchestrator
            .run_capped(&prompt, "Health Summary", Some(HEALTH_SUMMARY_MAX_TOKENS))
            .await;
        let (summary, model_used) = attempt.into_completion()?;
        info!(patient_id = %patient_id, model_used = %model_used, "Health summary generated");

        Ok(HealthSummary {
            summary,
            total_visits: records.len(),
            model_used: HEALTH_SUMMARY_BRAND.to_string(),
        })
    }

    pub async fn chat(&self, message: &str) -> AiResult<ChatReply> {
        let message = message.trim();
        require_text(message, "message")?;

        let category = categorize(message);
        let (platform_hits, medical_hits) = term_counts(message);
        info!(
            category = %category,
            platform_hits,
            medical_hits,
            "Categorized chat question"
        );

        let prompt = prompts::chat_prompt(category.context(), message);
        let (response, model_used) = self
            .orchestrator
            .run_capped(&prompt, "Chat", Some(CHAT_MAX_TOKENS))
            .await
            .into_completion()?;
        info!(category = %category, model_used = %model_used, "Chat answered");

        Ok(ChatReply {
            response: response.trim().to_string(),
            category,
            model_used: category.branding().to_string(),
        })
    }

    /// Question about an attached image, answered by the vision model.
    ///
    /// Only the vision model can read images, so there is no model fallback:
    /// each credential is tried once, in order, and the last failure is returned.
    pub async fn chat_with_image(
        &self,
        message: &str,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> AiResult<ChatReply> {
        if image_bytes.is_empty() {
            return Err(AiError::InvalidInput("image must not be empty".to_string()));
        }
        let mime_type = match mime_type.trim() {
            "" => "image/jpeg",
            mime if mime.starts_with("image/") => mime,
            other => {
                return Err(AiError::InvalidInput(format!("unsupported image type '{other}'")));
            }
        };
        let message = match message.trim() {
            "" => prompts::DEFAULT_VISION_QUESTION,
            text => text,
        };
        let image = ImageAttachment::new(image_bytes.to_vec(), mime_type);
        info!(mime_type, image_bytes = image.bytes.len(), "Answering image question");

        let mut outcome = None;
        for credential in &self.vision_credentials {
            let attempt = self
                .endpoint
                .invoke_vision(message, &image, &self.vision_model, credential, Some(VISION_MAX_TOKENS))
                .await;
            let succeeded = attempt.is_success();
            if !succeeded {
                warn!(
                    model = %self.vision_model,
                    credential = %credential.label(),
                    kind = %attempt.error_kind().unwrap_or(AiErrorKind::Unknown),
                    reason = attempt.error_reason().unwrap_or_default(),
                    "Vision attempt failed"
                );
            }
            outcome = Some(attempt);
            if succeeded {
                break;
            }
        }

        let attempt = outcome.ok_or_else(|| AiError::Config("no API credentials configured".to_string()))?;
        let (response, model_used) = attempt.into_completion()?;
        info!(model_used = %model_used, "Vision question answered");

        Ok(ChatReply {
            response: response.trim().to_string(),
            category: CategoryDecision::Vision,
            model_used: CategoryDecision::Vision.branding().to_string(),
        })
    }
}

fn require_text(value: &str, field: &str) -> AiResult<()> {
    if value.trim().is_empty() {
        return Err(AiError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}
