//! Status Service
//!
//! Resolves the current status of an upstream execution, keeping the
//! execution cache up to date along the way.

use relay_client::{ClientError, UpstreamClient};
use relay_core::{ExecutionCacheEntry, NormalizedJobPayload, normalize, normalize_execution};

use crate::cache::{ExecutionCache, StoreError};

/// Service error type
#[derive(Debug)]
pub enum StatusError {
    /// No status source configured and nothing cached for this id
    NotFound(String),
    Upstream(ClientError),
    Store(StoreError),
}

impl From<ClientError> for StatusError {
    fn from(err: ClientError) -> Self {
        StatusError::Upstream(err)
    }
}

impl From<StoreError> for StatusError {
    fn from(err: StoreError) -> Self {
        StatusError::Store(err)
    }
}

/// Ask the configured upstream status source about a job
///
/// The status webhook takes precedence over the execution API. Never
/// invents a terminal status: failures are returned as errors.
pub async fn fetch_status(
    upstream: &UpstreamClient,
    job_id: &str,
) -> Result<NormalizedJobPayload, ClientError> {
    if upstream.endpoints().status_webhook_url.is_some() {
        let mut payload = normalize(upstream.fetch_status_webhook(job_id).await?);
        if payload.job_id.is_none() {
            payload.job_id = Some(job_id.to_string());
        }
        return Ok(payload);
    }

    if upstream.has_execution_api() {
        let record = upstream.fetch_execution(job_id).await?;
        return Ok(normalize_execution(job_id, record));
    }

    Err(ClientError::NotConfigured("TARGET_STATUS_WEBHOOK or N8N_API"))
}

/// Fetch fresh status and record it in the cache
///
/// The sequence number is taken before the request goes out, so an answer
/// that arrives after a newer one is discarded by the store.
pub async fn refresh(
    upstream: &UpstreamClient,
    cache: &ExecutionCache,
    job_id: &str,
) -> Result<ExecutionCacheEntry, StatusError> {
    let sequence = cache.next_sequence();
    let payload = fetch_status(upstream, job_id).await?;

    record(cache, job_id, &payload, sequence).await
}

/// Like [`refresh`], but always asks the execution API
///
/// Background polling follows the execution record even when a status
/// webhook is configured.
pub async fn refresh_execution(
    upstream: &UpstreamClient,
    cache: &ExecutionCache,
    job_id: &str,
) -> Result<ExecutionCacheEntry, StatusError> {
    let sequence = cache.next_sequence();
    let execution = upstream.fetch_execution(job_id).await?;
    let payload = normalize_execution(job_id, execution);

    record(cache, job_id, &payload, sequence).await
}

async fn record(
    cache: &ExecutionCache,
    job_id: &str,
    payload: &NormalizedJobPayload,
    sequence: u64,
) -> Result<ExecutionCacheEntry, StatusError> {
    let entry = ExecutionCacheEntry::from_payload(job_id, payload, sequence);
    Ok(cache.record(entry).await?)
}

/// Current status of a job for the status endpoints
///
/// Prefers a fresh upstream answer; falls back to the cached entry when the
/// upstream is unavailable or no status source is configured.
pub async fn get_status(
    upstream: &UpstreamClient,
    cache: &ExecutionCache,
    job_id: &str,
) -> Result<ExecutionCacheEntry, StatusError> {
    match refresh(upstream, cache, job_id).await {
        Ok(entry) => Ok(entry),
        Err(StatusError::Upstream(err)) => {
            if let Some(cached) = cache.get(job_id).await? {
                if !err.is_not_configured() {
                    tracing::warn!(
                        "Status lookup for {} failed, serving cached entry: {}",
                        job_id,
                        err
                    );
                }
                return Ok(cached);
            }

            if err.is_not_configured() {
                Err(StatusError::NotFound(job_id.to_string()))
            } else {
                Err(StatusError::Upstream(err))
            }
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_client::UpstreamEndpoints;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn execution_api(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(UpstreamEndpoints {
            execution_api_url: Some(server.uri()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_unknown_job_without_source_is_not_found() {
        let upstream = UpstreamClient::new(UpstreamEndpoints::default());
        let cache = ExecutionCache::in_memory();

        let err = get_status(&upstream, &cache, "abc123").await.unwrap_err();
        assert!(matches!(err, StatusError::NotFound(id) if id == "abc123"));
    }

    #[tokio::test]
    async fn test_cached_job_without_source_is_served() {
        let upstream = UpstreamClient::new(UpstreamEndpoints::default());
        let cache = ExecutionCache::in_memory();
        let payload = normalize(json!({ "executionId": "abc123", "status": "processing" }));
        cache
            .record(ExecutionCacheEntry::from_payload("abc123", &payload, cache.next_sequence()))
            .await
            .unwrap();

        let entry = get_status(&upstream, &cache, "abc123").await.unwrap();
        assert_eq!(entry.status, "processing");
    }

    #[tokio::test]
    async fn test_execution_api_result_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/executions/abc123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "finished": true, "data": { "score": 91 } })),
            )
            .mount(&server)
            .await;

        let upstream = execution_api(&server);
        let cache = ExecutionCache::in_memory();

        let entry = get_status(&upstream, &cache, "abc123").await.unwrap();
        assert_eq!(entry.status, "completed");
        assert_eq!(entry.result, json!({ "score": 91 }));
        assert_eq!(cache.get("abc123").await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_upstream_failure_without_cache_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let upstream = execution_api(&server);
        let cache = ExecutionCache::in_memory();

        let err = get_status(&upstream, &cache, "abc123").await.unwrap_err();
        match err {
            StatusError::Upstream(ClientError::ApiError { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_webhook_takes_precedence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "QUEUED" })))
            .mount(&server)
            .await;

        let upstream = UpstreamClient::new(UpstreamEndpoints {
            status_webhook_url: Some(format!("{}/status", server.uri())),
            execution_api_url: Some(server.uri()),
            ..Default::default()
        });

        let payload = fetch_status(&upstream, "j9").await.unwrap();
        assert_eq!(payload.status.as_deref(), Some("queued"));
        assert_eq!(payload.job_id.as_deref(), Some("j9"));
    }

    #[tokio::test]
    async fn test_refresh_execution_skips_status_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/executions/j9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "finished": true })))
            .expect(1)
            .mount(&server)
            .await;

        let upstream = UpstreamClient::new(UpstreamEndpoints {
            status_webhook_url: Some(format!("{}/status", server.uri())),
            execution_api_url: Some(server.uri()),
            ..Default::default()
        });
        let cache = ExecutionCache::in_memory();

        let entry = refresh_execution(&upstream, &cache, "j9").await.unwrap();
        assert_eq!(entry.status, "completed");
        assert_eq!(cache.get("j9").await.unwrap(), Some(entry));
    }
}
