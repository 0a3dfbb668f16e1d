//! Triage output contract shared by the remote advisor and the rule engine.
//!
//! `validate()` is the single definition of "valid triage output". Both
//! decision paths are checked against it before a result leaves the
//! orchestrator.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::{Likelihood, TriageLevel};
use super::questionnaire::Questionnaire;

pub const RATIONALE_MIN: usize = 1;
pub const POSSIBLE_CONDITIONS: RangeInclusive<usize> = 1..=6;
pub const GUIDANCE_ITEMS: RangeInclusive<usize> = 1..=10;
pub const RED_FLAGS_TO_WATCH: RangeInclusive<usize> = 1..=12;

/// A hypothesis, never a diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PossibleCondition {
    pub name: String,
    pub likelihood: Likelihood,
    pub why_it_fits: String,
}

/// Triage recommendation plus actionable guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriageResult {
    pub triage_level: TriageLevel,
    pub summary: String,
    pub rationale: Vec<String>,
    pub possible_conditions: Vec<PossibleCondition>,
    pub self_care: Vec<String>,
    pub pharmacy_advice: Vec<String>,
    pub see_doctor: Vec<String>,
    pub emergency_actions: Vec<String>,
    pub red_flags_to_watch: Vec<String>,
    pub disclaimer: String,
}

/// A triage result that does not satisfy the output contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("Field '{0}' must not be blank")]
    Blank(&'static str),

    #[error("Field '{field}' has {len} entries; expected {min} to {max}")]
    Count {
        field: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("Field '{field}' entry {index} is blank")]
    BlankEntry { field: &'static str, index: usize },

    #[error("Self-harm red flag requires an emergency verdict (got {0})")]
    SelfHarmNotEmergency(TriageLevel),
}

impl TriageResult {
    /// Check shape and bounds of every field.
    pub fn validate(&self) -> Result<(), ContractError> {
        require_text("summary", &self.summary)?;
        require_text("disclaimer", &self.disclaimer)?;

        require_list("rationale", &self.rationale, RATIONALE_MIN..=usize::MAX)?;
        require_count(
            "possible_conditions",
            self.possible_conditions.len(),
            POSSIBLE_CONDITIONS,
        )?;
        for (index, condition) in self.possible_conditions.iter().enumerate() {
            if condition.name.trim().is_empty() {
                return Err(ContractError::BlankEntry {
                    field: "possible_conditions",
                    index,
                });
            }
        }
        require_list("self_care", &self.self_care, GUIDANCE_ITEMS)?;
        require_list("pharmacy_advice", &self.pharmacy_advice, GUIDANCE_ITEMS)?;
        require_list("see_doctor", &self.see_doctor, GUIDANCE_ITEMS)?;
        require_list("emergency_actions", &self.emergency_actions, GUIDANCE_ITEMS)?;
        require_list("red_flags_to_watch", &self.red_flags_to_watch, RED_FLAGS_TO_WATCH)?;

        Ok(())
    }

    /// Contract check plus the invariants that depend on the questionnaire.
    ///
    /// The self-harm flag forces `emergency` regardless of any other answer.
    pub fn validate_for(&self, questionnaire: &Questionnaire) -> Result<(), ContractError> {
        self.validate()?;
        if questionnaire.red_flags().suicidal_thoughts
            && self.triage_level != TriageLevel::Emergency
        {
            return Err(ContractError::SelfHarmNotEmergency(self.triage_level));
        }
        Ok(())
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::Blank(field));
    }
    Ok(())
}

fn require_count(
    field: &'static str,
    len: usize,
    bounds: RangeInclusive<usize>,
) -> Result<(), ContractError> {
    if !bounds.contains(&len) {
        return Err(ContractError::Count {
            field,
            len,
            min: *bounds.start(),
            max: *bounds.end(),
        });
    }
    Ok(())
}

fn require_list(
    field: &'static str,
    items: &[String],
    bounds: RangeInclusive<usize>,
) -> Result<(), ContractError> {
    require_count(field, items.len(), bounds)?;
    match items.iter().position(|item| item.trim().is_empty()) {
        Some(index) => Err(ContractError::BlankEntry { field, index }),
        None => Ok(()),
    }
}
