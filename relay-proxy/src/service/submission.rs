//! Submission Service
//!
//! Forwards a form submission to the upstream webhook and classifies the
//! answer: an accepted asynchronous job, a final result, or a body that is
//! relayed to the caller untouched.

use relay_client::{ClientError, WebhookResponse};
use relay_core::dto::job::{SubmissionAccepted, SubmissionCompleted};
use relay_core::{ExecutionCacheEntry, extract_artifact, find_download_url, normalize};
use serde_json::Value;

use crate::cache::StoreError;
use crate::state::AppState;

const ACCEPTED_MESSAGE: &str = "SEO workflow triggered. Poll the status endpoint for the report.";

/// What the submission endpoint should answer with
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Upstream started an asynchronous job (202)
    Accepted(SubmissionAccepted),
    /// Upstream answered with a final result (200)
    Completed(SubmissionCompleted),
    /// Relay the upstream body and content type unchanged
    Passthrough {
        status: u16,
        content_type: String,
        body: Vec<u8>,
    },
}

/// Service error type
#[derive(Debug)]
pub enum SubmissionError {
    Upstream(ClientError),
    /// The workflow itself reported an error status
    Workflow(String),
    Store(StoreError),
}

impl From<ClientError> for SubmissionError {
    fn from(err: ClientError) -> Self {
        SubmissionError::Upstream(err)
    }
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        SubmissionError::Store(err)
    }
}

/// Forward a submission and interpret the upstream answer
pub async fn submit(state: &AppState, body: &Value) -> Result<SubmissionOutcome, SubmissionError> {
    let response = state.upstream.submit(body).await?;

    if !response.is_json() {
        tracing::debug!(
            "Relaying {} byte {} response unchanged",
            response.body.len(),
            response.content_type
        );
        return Ok(passthrough(response));
    }

    let value = match serde_json::from_slice::<Value>(&response.body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Upstream declared JSON but sent something else: {}", e);
            return Ok(passthrough(response));
        }
    };

    let payload = normalize(value);

    if payload.is_error() {
        let message = payload
            .message
            .unwrap_or_else(|| "The workflow reported an error".to_string());
        tracing::warn!("Workflow error: {}", message);
        return Err(SubmissionError::Workflow(message));
    }

    if payload.is_in_flight() {
        if let Some(job_id) = &payload.job_id {
            let sequence = state.cache.next_sequence();
            state
                .cache
                .record(ExecutionCacheEntry::from_payload(job_id, &payload, sequence))
                .await?;

            tracing::info!("Upstream accepted job {}", job_id);

            if state.upstream.has_execution_api() {
                state.poller.register(job_id).await;
            }
        }

        return Ok(SubmissionOutcome::Accepted(SubmissionAccepted {
            job_id: payload.job_id.clone(),
            execution_id: payload.job_id.clone(),
            status: payload.status_or_processing().to_string(),
            message: payload.message.or_else(|| Some(ACCEPTED_MESSAGE.to_string())),
        }));
    }

    if let Some(job_id) = &payload.job_id {
        let sequence = state.cache.next_sequence();
        state
            .cache
            .record(ExecutionCacheEntry::from_payload(job_id, &payload, sequence))
            .await?;
    }

    let artifact = extract_artifact(&payload.raw);
    let download_url = find_download_url(&payload.result);

    tracing::info!(
        "Upstream returned a final result (artifact: {}, link: {})",
        artifact.is_some(),
        download_url.is_some()
    );

    let completed = SubmissionCompleted {
        status: payload.status,
        job_id: payload.job_id,
        message: payload.message,
        pdf_blob: None,
        pdf_base64: None,
        download_url,
        result: payload.result,
        raw: payload.raw,
    };

    Ok(SubmissionOutcome::Completed(completed.with_artifact(artifact)))
}

fn passthrough(response: WebhookResponse) -> SubmissionOutcome {
    SubmissionOutcome::Passthrough {
        status: response.status,
        content_type: response.content_type,
        body: response.body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(server: &MockServer) -> AppState {
        AppState::new(&Config {
            webhook_url: Some(server.uri()),
            ..Config::default()
        })
    }

    async fn upstream_answers(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_job_id_is_accepted_and_cached() {
        let server = upstream_answers(
            ResponseTemplate::new(200).set_body_json(json!([{ "executionId": "abc123" }])),
        )
        .await;
        let state = state(&server);

        let outcome = submit(&state, &json!({ "url": "https://example.com" }))
            .await
            .unwrap();

        match outcome {
            SubmissionOutcome::Accepted(accepted) => {
                assert_eq!(accepted.job_id.as_deref(), Some("abc123"));
                assert_eq!(accepted.execution_id.as_deref(), Some("abc123"));
                assert_eq!(accepted.status, "processing");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let entry = state.cache.get("abc123").await.unwrap().unwrap();
        assert_eq!(entry.status, "processing");
        // No execution API configured, so nothing polls in the background
        assert!(!state.poller.is_polling("abc123").await);
    }

    #[tokio::test]
    async fn test_final_result_carries_artifact_and_link() {
        let server = upstream_answers(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": {
                "report": { "pdf": "JVBERi0xLjQK" },
                "links": ["https://cdn.example.com/report.pdf"]
            }
        })))
        .await;
        let state = state(&server);

        let outcome = submit(&state, &json!({ "url": "https://example.com" }))
            .await
            .unwrap();

        match outcome {
            SubmissionOutcome::Completed(completed) => {
                assert_eq!(completed.status.as_deref(), Some("completed"));
                assert_eq!(completed.pdf_base64.as_deref(), Some("JVBERi0xLjQK"));
                assert_eq!(
                    completed.download_url.as_deref(),
                    Some("https://cdn.example.com/report.pdf")
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_workflow_error() {
        let server = upstream_answers(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "failed", "message": "crawler blocked" })),
        )
        .await;
        let state = state(&server);

        let err = submit(&state, &json!({})).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Workflow(msg) if msg == "crawler blocked"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_relayed() {
        let server = upstream_answers(
            ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
        )
        .await;
        let state = state(&server);

        match submit(&state, &json!({})).await.unwrap() {
            SubmissionOutcome::Passthrough { status, body, .. } => {
                assert_eq!(status, 200);
                assert_eq!(body, b"{not json");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_webhook_is_not_configured() {
        let state = AppState::new(&Config::default());

        let err = submit(&state, &json!({})).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Upstream(e) if e.is_not_configured()));
    }
}
