use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::models::{Questionnaire, TriageResult};
use crate::triage::{AdvisorError, TriageAdvisor};

use super::prompt::build_messages;
use super::schema::{triage_result_schema, SCHEMA_NAME};
use super::types::{ChatRequest, ChatResponse, ErrorEnvelope, JsonSchemaFormat, ResponseFormat};
use super::validate::{validate_base_url, validate_model_name};
use super::RemoteError;

/// Sampling temperature for triage requests.
pub const TRIAGE_TEMPERATURE: f32 = 0.1;

/// Longest error body excerpt kept from a failed response.
const MAX_ERROR_EXCERPT: usize = 200;

/// Connection settings for the remote advisor.
#[derive(Clone)]
pub struct AdvisorSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for AdvisorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct RemoteAdvisor {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl RemoteAdvisor {
    /// Validate settings and build the HTTP client.
    pub fn new(settings: AdvisorSettings) -> Result<Self, RemoteError> {
        validate_base_url(&settings.base_url)?;
        validate_model_name(&settings.model)?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model,
            api_key: settings.api_key,
            client,
            timeout_secs: settings.timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request body for one questionnaire.
    pub fn build_request(&self, questionnaire: &Questionnaire) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: build_messages(questionnaire),
            temperature: TRIAGE_TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: SCHEMA_NAME,
                    strict: true,
                    schema: triage_result_schema(),
                },
            },
        }
    }

    /// POST the questionnaire and parse the structured result.
    ///
    /// The result is checked against the contract bounds before it is
    /// returned. Checks that depend on the questionnaire are left to the caller.
    pub async fn triage(&self, questionnaire: &Questionnaire) -> Result<TriageResult, RemoteError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(questionnaire);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteError::MalformedResponse(e.to_string()))?;
        let result = parse_completion(parsed)?;
        result
            .validate()
            .map_err(|e| RemoteError::Contract(e.to_string()))?;
        Ok(result)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            RemoteError::Network(format!("Cannot connect to {}", self.base_url))
        } else {
            RemoteError::Network(err.without_url().to_string())
        }
    }
}

/// Extract the triage result from the first choice.
fn parse_completion(response: ChatResponse) -> Result<TriageResult, RemoteError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::MalformedResponse("no choices returned".into()))?;

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(RemoteError::Refused(refusal));
    }

    if choice.finish_reason.as_deref() == Some("length") {
        return Err(RemoteError::MalformedResponse(
            "output truncated at the token limit".into(),
        ));
    }

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| RemoteError::MalformedResponse("empty message content".into()))?;

    serde_json::from_str(&content).map_err(|e| RemoteError::Contract(e.to_string()))
}

/// Prefer the structured error message; fall back to a body excerpt.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(MAX_ERROR_EXCERPT).collect(),
    }
}

impl TriageAdvisor for RemoteAdvisor {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn request_triage<'a>(
        &'a self,
        questionnaire: &'a Questionnaire,
    ) -> BoxFuture<'a, Result<TriageResult, AdvisorError>> {
        async move { Ok(self.triage(questionnaire).await?) }.boxed()
    }
}
