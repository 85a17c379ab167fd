//! Payload normalizer
//!
//! Maps arbitrary upstream response bodies onto [`NormalizedJobPayload`].
//! Workflow tools wrap single results in one-element arrays and disagree on
//! key names, so each field is looked up through an ordered alias list.

use serde_json::{Map, Value};

use crate::domain::job::NormalizedJobPayload;
use crate::domain::status;

const JOB_ID_KEYS: [&str; 4] = ["jobId", "executionId", "id", "execution_id"];
const STATUS_KEYS: [&str; 3] = ["status", "state", "executionStatus"];
const MESSAGE_KEYS: [&str; 3] = ["message", "detail", "error"];
const RESULT_KEYS: [&str; 5] = ["result", "data", "payload", "output", "body"];

/// Engine statuses of an unfinished execution that mean it will never finish
const FAILED_EXECUTION_STATUSES: [&str; 3] = ["error", "crashed", "failed"];

/// Normalize a response body given as text
///
/// Text that is not valid JSON becomes a raw-only payload holding the
/// original string.
pub fn normalize_text(text: &str) -> NormalizedJobPayload {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => normalize_parsed(value),
        Err(_) => NormalizedJobPayload::raw_only(Value::String(text.to_string())),
    }
}

/// Normalize an already-parsed value
///
/// A JSON string value is treated like response text and parsed again.
pub fn normalize(value: Value) -> NormalizedJobPayload {
    match value {
        Value::String(text) => normalize_text(&text),
        other => normalize_parsed(other),
    }
}

/// Normalize a workflow-engine execution record
///
/// The engine reports `finished: bool` rather than a status string.
pub fn normalize_execution(job_id: &str, value: Value) -> NormalizedJobPayload {
    let finished = value
        .get("finished")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let status = if finished {
        status::COMPLETED
    } else {
        let engine_status = value
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_lowercase);
        match engine_status {
            Some(s) if FAILED_EXECUTION_STATUSES.contains(&s.as_str()) => status::ERROR,
            _ => status::PROCESSING,
        }
    };

    let (message, result) = match value.as_object() {
        Some(obj) => (
            first_message(obj),
            obj.get("data")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| value.clone()),
        ),
        None => (None, value.clone()),
    };

    NormalizedJobPayload {
        job_id: Some(job_id.to_string()),
        status: Some(status.to_string()),
        message,
        result,
        raw: value,
    }
}

fn normalize_parsed(raw: Value) -> NormalizedJobPayload {
    let item = match &raw {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    let Some(obj) = item.and_then(Value::as_object) else {
        return NormalizedJobPayload::raw_only(raw);
    };

    let result = RESULT_KEYS
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
        .cloned()
        .unwrap_or_else(|| Value::Object(obj.clone()));

    NormalizedJobPayload {
        job_id: first_job_id(obj, &JOB_ID_KEYS),
        status: STATUS_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::to_lowercase),
        message: first_message(obj),
        result,
        raw,
    }
}

/// Look up a job id under caller-supplied key names
///
/// Applies the same array unwrapping and coercion as [`normalize`].
pub fn find_job_id(value: &Value, keys: &[&str]) -> Option<String> {
    let item = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    first_job_id(item.as_object()?, keys)
}

/// First usable identifier among `keys`, coerced to a string
fn first_job_id(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn first_message(obj: &Map<String, Value>) -> Option<String> {
    MESSAGE_KEYS.iter().find_map(|key| match obj.get(*key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(inner) => Some(
            inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(inner.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    })
}
