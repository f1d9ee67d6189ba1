use std::sync::Arc;
use tracing::{error, info, warn};

use crate::adapter::ModelEndpoint;
use crate::attempt::AttemptResult;
use crate::config::{AiConfig, Credential};
use crate::error::AiErrorKind;

/// Number of attempts in every escalation.
pub const PLAN_LEN: usize = 4;

/// One (model, credential) combination of the plan
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub model_id: String,
    pub credential: Arc<Credential>,
}

/// Fixed escalation order:
/// primary/primary, fallback/primary, primary/backup, fallback/backup.
#[derive(Debug, Clone)]
pub struct EscalationPlan {
    entries: [PlanEntry; PLAN_LEN],
}

impl EscalationPlan {
    pub fn new(
        primary_model: &str,
        fallback_model: &str,
        primary_credential: Arc<Credential>,
        backup_credential: Arc<Credential>,
    ) -> Self {
        let entry = |model: &str, credential: &Arc<Credential>| PlanEntry {
            model_id: model.to_string(),
            credential: Arc::clone(credential),
        };

        Self {
            entries: [
                entry(primary_model, &primary_credential),
                entry(fallback_model, &primary_credential),
                entry(primary_model, &backup_credential),
                entry(fallback_model, &backup_credential),
            ],
        }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(
            &config.primary_model,
            &config.fallback_model,
            Arc::clone(&config.primary_credential),
            Arc::clone(&config.backup_credential),
        )
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Primary then backup credential; each covers two consecutive entries.
    pub fn credentials(&self) -> Vec<Arc<Credential>> {
        self.entries
            .iter()
            .step_by(2)
            .map(|entry| Arc::clone(&entry.credential))
            .collect()
    }
}

/// Runs one logical request through the escalation plan.
///
/// Attempts are strictly sequential and every run starts at entry 1. Failures
/// are never retried or skipped by kind, and identical credentials are not
/// deduplicated.
pub struct FallbackOrchestrator {
    endpoint: Arc<dyn ModelEndpoint>,
    plan: EscalationPlan,
}

impl FallbackOrchestrator {
    pub fn new(endpoint: Arc<dyn ModelEndpoint>, plan: EscalationPlan) -> Self {
        Self { endpoint, plan }
    }

    pub fn plan(&self) -> &EscalationPlan {
        &self.plan
    }

    /// First success, or the last failure once all four attempts failed.
    pub async fn run(&self, prompt: &str, task_label: &str) -> AttemptResult {
        self.run_capped(prompt, task_label, None).await
    }

    /// [`run`](Self::run) with an output token cap passed to every attempt.
    pub async fn run_capped(
        &self,
        prompt: &str,
        task_label: &str,
        max_output_tokens: Option<u32>,
    ) -> AttemptResult {
        let mut last_failure = None;

        for (index, entry) in self.plan.entries().iter().enumerate() {
            let attempt = index + 1;
            info!(
                task = %task_label,
                attempt,
                total = PLAN_LEN,
                model = %entry.model_id,
                credential = %entry.credential.label(),
                "Calling model"
            );

            let result = self
                .endpoint
                .invoke(prompt, &entry.model_id, &entry.credential, max_output_tokens)
                .await;

            if result.is_success() {
                info!(
                    task = %task_label,
                    attempt,
                    model_used = %result.model_used(),
                    "Model call succeeded"
                );
                return result;
            }

            warn!(
                task = %task_label,
                attempt,
                model = %entry.model_id,
                credential = %entry.credential.label(),
                kind = %result.error_kind().unwrap_or(AiErrorKind::Unknown),
                reason = result.error_reason().unwrap_or_default(),
                "Model attempt failed"
            );
            last_failure = Some(result);
        }

        error!(task = %task_label, attempts = PLAN_LEN, "All model attempts failed");
        last_failure.unwrap_or_else(|| {
            AttemptResult::failure(AiErrorKind::Unknown, "Escalation plan is empty", "", "")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockModelEndpoint;
    use mockall::Sequence;

    const PRIMARY: &str = "primary-model";
    const FALLBACK: &str = "fallback-model";

    fn plan() -> EscalationPlan {
        EscalationPlan::new(
            PRIMARY,
            FALLBACK,
            Arc::new(Credential::new("Primary API", "key-a")),
            Arc::new(Credential::new("Backup API", "key-b")),
        )
    }

    fn expect_attempt(
        mock: &mut MockModelEndpoint,
        seq: &mut Sequence,
        model: &'static str,
        label: &'static str,
        succeed: bool,
    ) {
        mock.expect_invoke()
            .withf(move |_, model_id, credential, _| {
                model_id.to_string() == model && credential.label() == label
            })
            .times(1)
            .in_sequence(seq)
            .returning(move |_, model_id, credential, _| {
                if succeed {
                    AttemptResult::success("generated", model_id.to_string(), credential.label())
                } else {
                    AttemptResult::failure(
                        AiErrorKind::Server,
                        format!("HTTP 503 from {model_id}"),
                        model_id.to_string(),
                        credential.label(),
                    )
                }
            });
    }

    #[test]
    fn test_plan_order() {
        let plan = plan();
        let order: Vec<(&str, &str)> = plan
            .entries()
            .iter()
            .map(|e| (e.model_id.as_str(), e.credential.label()))
            .collect();

        assert_eq!(
            order,
            vec![
                (PRIMARY, "Primary API"),
                (FALLBACK, "Primary API"),
                (PRIMARY, "Backup API"),
                (FALLBACK, "Backup API"),
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let mut mock = MockModelEndpoint::new();
        let mut seq = Sequence::new();
        expect_attempt(&mut mock, &mut seq, PRIMARY, "Primary API", false);
        expect_attempt(&mut mock, &mut seq, FALLBACK, "Primary API", true);

        let orchestrator = FallbackOrchestrator::new(Arc::new(mock), plan());
        let result = orchestrator.run("prompt", "Clinical Summary").await;

        assert!(result.is_success());
        assert_eq!(result.model_used(), "fallback-model (Primary API)");
        // mock verifies exactly two calls on drop
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_failure() {
        let mut mock = MockModelEndpoint::new();
        let mut seq = Sequence::new();
        expect_attempt(&mut mock, &mut seq, PRIMARY, "Primary API", false);
        expect_attempt(&mut mock, &mut seq, FALLBACK, "Primary API", false);
        expect_attempt(&mut mock, &mut seq, PRIMARY, "Backup API", false);
        expect_attempt(&mut mock, &mut seq, FALLBACK, "Backup API", false);

        let orchestrator = FallbackOrchestrator::new(Arc::new(mock), plan());
        let result = orchestrator.run("prompt", "Medical Decision Making").await;

        assert!(!result.is_success());
        assert_eq!(result.error_reason(), Some("HTTP 503 from fallback-model"));
        assert_eq!(result.credential_label, "Backup API");
    }

    #[test]
    fn test_credentials_in_escalation_order() {
        let labels: Vec<String> = plan()
            .credentials()
            .iter()
            .map(|credential| credential.label().to_string())
            .collect();
        assert_eq!(labels, vec!["Primary API", "Backup API"]);
    }

    #[tokio::test]
    async fn test_each_run_restarts_at_first_entry() {
        let mut mock = MockModelEndpoint::new();
        let mut seq = Sequence::new();
        // first run escalates to the backup credential
        expect_attempt(&mut mock, &mut seq, PRIMARY, "Primary API", false);
        expect_attempt(&mut mock, &mut seq, FALLBACK, "Primary API", false);
        expect_attempt(&mut mock, &mut seq, PRIMARY, "Backup API", true);
        // second run starts over at primary/primary
        expect_attempt(&mut mock, &mut seq, PRIMARY, "Primary API", true);

        let orchestrator = FallbackOrchestrator::new(Arc::new(mock), plan());
        let first = orchestrator.run("prompt", "Clinical Summary").await;
        let second = orchestrator.run("prompt", "Medical Decision Making").await;

        assert_eq!(first.model_used(), "primary-model (Backup API)");
        assert_eq!(second.model_used(), "primary-model (Primary API)");
    }

    #[tokio::test]
    async fn test_shared_credential_still_makes_four_calls() {
        let shared = Arc::new(Credential::new("Primary API", "same-key"));
        let plan = EscalationPlan::new(PRIMARY, FALLBACK, Arc::clone(&shared), shared);

        let mut mock = MockModelEndpoint::new();
        mock.expect_invoke().times(4).returning(|_, model_id, credential, _| {
            AttemptResult::failure(
                AiErrorKind::Authentication,
                "HTTP 401",
                model_id.to_string(),
                credential.label(),
            )
        });

        let orchestrator = FallbackOrchestrator::new(Arc::new(mock), plan);
        let result = orchestrator.run("prompt", "Chat").await;

        assert_eq!(result.error_kind(), Some(AiErrorKind::Authentication));
    }

    #[tokio::test]
    async fn test_cap_forwarded_to_every_attempt() {
        let mut mock = MockModelEndpoint::new();
        mock.expect_invoke()
            .withf(|_, _, _, max| *max == Some(800))
            .times(4)
            .returning(|_, model_id, credential, _| {
                AttemptResult::failure(AiErrorKind::Timeout, "timed out", model_id.to_string(), credential.label())
            });

        let orchestrator = FallbackOrchestrator::new(Arc::new(mock), plan());
        let result = orchestrator.run_capped("prompt", "Health Summary", Some(800)).await;

        assert_eq!(result.error_kind(), Some(AiErrorKind::Timeout));
    }
}
