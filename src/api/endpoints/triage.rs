//! `POST /api/triage`: questionnaire in, triage result out.
//!
//! Advisor failures are invisible here: the orchestrator always returns a
//! result, flagged with a note when it came from the rule engine. Only a
//! malformed body or an invalid questionnaire produce an error status.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{QuestionnaireDraft, TriageResult};

const INVALID_BODY: &str = "Invalid request body";

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub questionnaire: Option<QuestionnaireDraft>,
}

#[derive(Debug, Serialize)]
pub struct TriageResponse {
    pub result: TriageResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

pub async fn submit(
    State(ctx): State<ApiContext>,
    payload: Result<Json<TriageRequest>, JsonRejection>,
) -> Result<Json<TriageResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        // Rejection text can quote the body; log only the status.
        tracing::debug!(status = %rejection.status(), "Rejected triage body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(INVALID_BODY.into())
        }
    })?;

    let draft = request
        .questionnaire
        .ok_or_else(|| ApiError::BadRequest(INVALID_BODY.into()))?;

    let outcome = ctx.orchestrator.handle_draft(&draft).await?;

    Ok(Json(TriageResponse {
        result: outcome.result,
        note: outcome.note,
    }))
}
