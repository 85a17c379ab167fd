//! Status API Handlers
//!
//! Polling endpoints for asynchronous jobs.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use relay_client::{ClientError, validate_job_id};
use relay_core::ExecutionCacheEntry;
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::service::status::StatusError;
use crate::service::status_service;
use crate::state::AppState;

/// Query parameters accepted by the status endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
    #[serde(rename = "executionId")]
    pub execution_id: Option<String>,
}

impl StatusQuery {
    /// `jobId` wins over `executionId`; blank values count as absent
    fn id(self) -> Option<String> {
        self.job_id
            .into_iter()
            .chain(self.execution_id)
            .map(|id| id.trim().to_string())
            .find(|id| !id.is_empty())
    }
}

/// GET /seo-feedback/status/{jobId}
/// Current status of a job
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ExecutionCacheEntry>> {
    lookup(&state, &job_id).await
}

/// GET /seo-feedback/status?jobId=, GET /api/seo-feedback-status?jobId=
/// Current status of a job named in the query string
pub async fn get_status_by_query(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<ExecutionCacheEntry>> {
    let job_id = query.id().unwrap_or_default();
    lookup(&state, &job_id).await
}

async fn lookup(state: &AppState, job_id: &str) -> ApiResult<Json<ExecutionCacheEntry>> {
    let job_id = job_id.trim();
    if job_id.is_empty() {
        return Err(ApiError::BadRequest("No jobId provided".to_string()));
    }

    if validate_job_id(job_id).is_err() {
        tracing::warn!("Refusing status lookup for job id {:?}", job_id);
        return Err(ApiError::BadRequest("Invalid jobId".to_string()));
    }

    tracing::debug!("Getting status for job: {}", job_id);

    let entry = status_service::get_status(&state.upstream, &state.cache, job_id)
        .await
        .map_err(|e| match e {
            StatusError::NotFound(_) => ApiError::NotFound,
            StatusError::Upstream(ClientError::ApiError { status, message }) => {
                ApiError::Upstream {
                    context: None,
                    status,
                    message,
                }
            }
            StatusError::Upstream(err) if err.is_timeout() => ApiError::GatewayTimeout,
            StatusError::Upstream(err) => ApiError::InternalError(err.to_string()),
            StatusError::Store(err) => ApiError::from(err),
        })?;

    Ok(Json(entry))
}
