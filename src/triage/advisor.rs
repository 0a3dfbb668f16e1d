//! The triage capability shared by the remote advisor and the rule engine.
//!
//! Returns a boxed future so advisors can be stored as `Arc<dyn TriageAdvisor>`
//! and swapped per deployment (or per test) without generics leaking into
//! the HTTP layer.

use std::time::Duration;

use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use thiserror::Error;

use crate::models::{ContractError, Questionnaire, TriageResult};
use crate::remote::RemoteError;

use super::engine::RuleEngine;

/// Produces a triage result for a validated questionnaire.
pub trait TriageAdvisor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Request a triage result. Dropping the future cancels the request.
    fn request_triage<'a>(
        &'a self,
        questionnaire: &'a Questionnaire,
    ) -> BoxFuture<'a, Result<TriageResult, AdvisorError>>;
}

/// Why an advisor result could not be used.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Advisor request failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("Advisor did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Advisor result violates the triage contract: {0}")]
    Contract(#[from] ContractError),
}

impl AdvisorError {
    /// Coarse category for logs (never includes response content).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Remote(e) => e.kind(),
            Self::Timeout(_) => "timeout",
            Self::Contract(_) => "contract",
        }
    }
}

impl TriageAdvisor for RuleEngine {
    fn name(&self) -> &'static str {
        "rule_engine"
    }

    fn request_triage<'a>(
        &'a self,
        questionnaire: &'a Questionnaire,
    ) -> BoxFuture<'a, Result<TriageResult, AdvisorError>> {
        future::ready(Ok(self.decide(questionnaire))).boxed()
    }
}
