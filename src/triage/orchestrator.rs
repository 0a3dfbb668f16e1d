//! Per-request choice between the remote advisor and the rule engine.
//!
//! Advisor failures (network, timeout, refusal, malformed or contract-invalid
//! output) never reach the caller: the rule engine answers instead and the
//! outcome is flagged as a fallback. The only error surfaced is an invalid
//! questionnaire, raised before any triage is attempted.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::models::{Questionnaire, QuestionnaireDraft, QuestionnaireError, TriageResult};

use super::advisor::{AdvisorError, TriageAdvisor};
use super::engine;

/// Upper bound on the advisor round trip.
pub const DEFAULT_ADVISOR_DEADLINE: Duration = Duration::from_secs(25);

/// Attached when a configured advisor failed.
pub const FALLBACK_NOTE: &str = "AI triage unavailable; returned fallback guidance.";

/// Attached when no advisor is configured.
pub const NOT_CONFIGURED_NOTE: &str = "AI triage not configured; returned rule-based guidance.";

/// Result of one triage request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriageOutcome {
    pub result: TriageResult,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Stateless request handler. Cheap to clone; safe to share across tasks.
#[derive(Clone)]
pub struct TriageOrchestrator {
    advisor: Option<Arc<dyn TriageAdvisor>>,
    deadline: Duration,
}

impl TriageOrchestrator {
    pub fn new(advisor: Option<Arc<dyn TriageAdvisor>>) -> Self {
        Self {
            advisor,
            deadline: DEFAULT_ADVISOR_DEADLINE,
        }
    }

    /// Orchestrator with no advisor: every request uses the rule engine.
    pub fn rule_based_only() -> Self {
        Self::new(None)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn advisor_configured(&self) -> bool {
        self.advisor.is_some()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Validate a draft, then triage it.
    pub async fn handle_draft(
        &self,
        draft: &QuestionnaireDraft,
    ) -> Result<TriageOutcome, QuestionnaireError> {
        let questionnaire = draft.resolve()?;
        Ok(self.handle(&questionnaire).await)
    }

    /// Triage a validated questionnaire. Always succeeds.
    pub async fn handle(&self, questionnaire: &Questionnaire) -> TriageOutcome {
        let span = tracing::info_span!("triage", request_id = %Uuid::new_v4());
        self.handle_inner(questionnaire).instrument(span).await
    }

    async fn handle_inner(&self, questionnaire: &Questionnaire) -> TriageOutcome {
        let Some(advisor) = &self.advisor else {
            let result = engine::decide(questionnaire);
            tracing::info!(
                source = "rule_engine",
                level = result.triage_level.as_str(),
                "Triage complete (no advisor configured)"
            );
            return TriageOutcome {
                result,
                used_fallback: true,
                note: Some(NOT_CONFIGURED_NOTE),
            };
        };

        match self.consult(advisor.as_ref(), questionnaire).await {
            Ok(result) => {
                tracing::info!(
                    source = advisor.name(),
                    level = result.triage_level.as_str(),
                    "Triage complete"
                );
                TriageOutcome {
                    result,
                    used_fallback: false,
                    note: None,
                }
            }
            Err(err) => {
                let result = engine::decide(questionnaire);
                tracing::warn!(
                    advisor = advisor.name(),
                    failure = err.kind(),
                    error = %err,
                    level = result.triage_level.as_str(),
                    "Advisor failed; using rule engine"
                );
                TriageOutcome {
                    result,
                    used_fallback: true,
                    note: Some(FALLBACK_NOTE),
                }
            }
        }
    }

    /// Call the advisor under the deadline and check its output.
    async fn consult(
        &self,
        advisor: &dyn TriageAdvisor,
        questionnaire: &Questionnaire,
    ) -> Result<TriageResult, AdvisorError> {
        let result = tokio::time::timeout(self.deadline, advisor.request_triage(questionnaire))
            .await
            .map_err(|_| AdvisorError::Timeout(self.deadline))??;
        result.validate_for(questionnaire)?;
        Ok(result)
    }
}

impl std::fmt::Debug for TriageOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageOrchestrator")
            .field("advisor", &self.advisor.as_ref().map(|a| a.name()))
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl Default for TriageOrchestrator {
    fn default() -> Self {
        Self::rule_based_only()
    }
}
