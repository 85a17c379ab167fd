//! Job domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status;

/// Canonical view of an upstream webhook or status response
///
/// Upstream workflows name their fields inconsistently; the normalizer
/// maps every variant onto this shape. `raw` always holds the parsed
/// input so later searches (PDF, download links) have something to scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedJobPayload {
    pub job_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub result: Value,
    pub raw: Value,
}

impl NormalizedJobPayload {
    /// Payload carrying only the raw value
    pub fn raw_only(raw: Value) -> Self {
        Self {
            job_id: None,
            status: None,
            message: None,
            result: Value::Null,
            raw,
        }
    }

    /// Reported status, or `processing` when the upstream gave none
    pub fn status_or_processing(&self) -> &str {
        self.status.as_deref().unwrap_or(status::PROCESSING)
    }

    /// True when the upstream explicitly reported a failure
    pub fn is_error(&self) -> bool {
        self.status.as_deref().is_some_and(status::is_error)
    }

    /// True when the job should be polled further
    ///
    /// A job id without an explicit status counts as still running.
    pub fn is_in_flight(&self) -> bool {
        match self.status.as_deref() {
            Some(s) => status::is_in_flight(s),
            None => self.job_id.is_some(),
        }
    }
}

/// Last known status of an upstream execution
///
/// Serialized as the body of the status endpoints. `sequence` orders
/// writes so that a slow, stale poll response cannot overwrite a newer one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionCacheEntry {
    pub execution_id: String,
    pub status: String,
    pub message: Option<String>,
    pub result: Value,
    /// Milliseconds since the Unix epoch
    pub cached_at: i64,
    #[serde(skip)]
    pub sequence: u64,
}

impl ExecutionCacheEntry {
    /// Build an entry from a normalized payload, stamped with the current time
    pub fn from_payload(
        execution_id: impl Into<String>,
        payload: &NormalizedJobPayload,
        sequence: u64,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            status: payload.status_or_processing().to_string(),
            message: payload.message.clone(),
            result: payload.result.clone(),
            cached_at: chrono::Utc::now().timestamp_millis(),
            sequence,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        status::is_in_flight(&self.status)
    }
}
