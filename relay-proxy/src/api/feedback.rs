//! Feedback API Handlers
//!
//! Submission of new analyses and results pushed back by the workflow.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use relay_core::dto::job::ResultAck;
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::service::result::ResultError;
use crate::service::submission::{SubmissionError, SubmissionOutcome};
use crate::service::{result_service, submission_service};
use crate::state::AppState;

// =============================================================================
// Submission Endpoints
// =============================================================================

/// POST /seo-feedback, POST /api/seo-feedback
/// Forward a submission to the workflow webhook
pub async fn submit_feedback(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))?;

    tracing::info!("Forwarding SEO feedback submission");

    let outcome = submission_service::submit(&state, &body)
        .await
        .map_err(|e| match e {
            SubmissionError::Upstream(err) => {
                ApiError::from_client(err, Some("Target webhook error"))
            }
            SubmissionError::Workflow(msg) => ApiError::Workflow(msg),
            SubmissionError::Store(err) => ApiError::from(err),
        })?;

    let response = match outcome {
        SubmissionOutcome::Accepted(accepted) => {
            (StatusCode::ACCEPTED, Json(accepted)).into_response()
        }
        SubmissionOutcome::Completed(completed) => (StatusCode::OK, Json(completed)).into_response(),
        SubmissionOutcome::Passthrough {
            status,
            content_type,
            body,
        } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
            [(header::CONTENT_TYPE, content_type)],
            body,
        )
            .into_response(),
    };

    Ok(response)
}

/// POST /seo-feedback/result
/// Store a final result pushed by the workflow
pub async fn push_result(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ResultAck>> {
    let body = String::from_utf8_lossy(&body);

    let entry = result_service::record_result(&state.cache, &body)
        .await
        .map_err(|e| match e {
            ResultError::MissingExecutionId => {
                ApiError::BadRequest("No executionId found in payload".to_string())
            }
            ResultError::Store(err) => ApiError::from(err),
        })?;

    Ok(Json(ResultAck {
        ok: true,
        execution_id: entry.execution_id,
    }))
}
