//! Remote triage advisor: an OpenAI-compatible chat completions endpoint
//! constrained to the triage result schema.

pub mod client;
pub mod prompt;
pub mod sanitize;
pub mod schema;
pub mod types;
pub mod validate;

pub use client::{AdvisorSettings, RemoteAdvisor};

// ──────────────────────────────────────────────
// Error Taxonomy
// ──────────────────────────────────────────────

/// Failure talking to the remote advisor.
///
/// Messages never echo patient input.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Invalid advisor URL: '{0}'")]
    InvalidUrl(String),

    #[error("Plain http is only allowed for loopback hosts (got '{0}')")]
    InsecureEndpoint(String),

    #[error("Invalid model name: '{0}'")]
    InvalidModelName(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Advisor returned an error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Advisor refused the request: {0}")]
    Refused(String),

    #[error("Malformed advisor response: {0}")]
    MalformedResponse(String),

    #[error("Advisor output does not match the result schema: {0}")]
    Contract(String),
}

impl RemoteError {
    /// Stable category name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) | Self::InsecureEndpoint(_) | Self::InvalidModelName(_) => {
                "configuration"
            }
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Api { .. } => "api",
            Self::Refused(_) => "refused",
            Self::MalformedResponse(_) => "malformed",
            Self::Contract(_) => "contract",
        }
    }
}
