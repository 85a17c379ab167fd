//! Result Service
//!
//! Stores final results the workflow pushes back to the proxy.

use relay_core::domain::status;
use relay_core::{ExecutionCacheEntry, find_job_id, normalize_text};
use serde_json::{Value, json};

use crate::cache::{ExecutionCache, StoreError};

/// Keys a pushed result may carry its execution id under, in priority order
const EXECUTION_ID_KEYS: [&str; 5] = ["executionId", "jobId", "id", "execId", "execution_id"];

/// Service error type
#[derive(Debug)]
pub enum ResultError {
    MissingExecutionId,
    Store(StoreError),
}

impl From<StoreError> for ResultError {
    fn from(err: StoreError) -> Self {
        ResultError::Store(err)
    }
}

/// Record a pushed result
///
/// The status defaults to `completed` and the whole pushed body becomes the
/// stored result. A body that is not JSON is kept as `{"raw": <text>}`.
pub async fn record_result(
    cache: &ExecutionCache,
    body: &str,
) -> Result<ExecutionCacheEntry, ResultError> {
    let value = serde_json::from_str::<Value>(body).unwrap_or_else(|_| json!({ "raw": body }));

    let execution_id =
        find_job_id(&value, &EXECUTION_ID_KEYS).ok_or(ResultError::MissingExecutionId)?;

    let mut payload = normalize_text(body);
    if payload.status.is_none() {
        payload.status = Some(status::COMPLETED.to_string());
    }
    payload.result = value;

    let entry = ExecutionCacheEntry::from_payload(&execution_id, &payload, cache.next_sequence());
    let entry = cache.record(entry).await?;

    tracing::info!("Stored pushed result for execution {} ({})", execution_id, entry.status);

    Ok(entry)
}
