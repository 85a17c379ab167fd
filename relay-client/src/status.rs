//! Status sources: public status webhook and execution API

use reqwest::Url;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::UpstreamClient;
use crate::error::{ClientError, Result};

/// Header carrying the workflow-engine API key
const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Check that a job id can name exactly one execution
///
/// Ids that are empty, contain a path separator, contain `..`, or carry
/// control characters are refused.
pub fn validate_job_id(job_id: &str) -> Result<()> {
    let invalid = job_id.is_empty()
        || job_id == "."
        || job_id.contains("..")
        || job_id.contains(['/', '\\'])
        || job_id.chars().any(char::is_control);

    if invalid {
        return Err(ClientError::InvalidJobId(job_id.to_string()));
    }

    Ok(())
}

/// `{base}/executions/{job_id}` with the id pushed as one encoded segment
fn execution_url(base: &str, job_id: &str) -> Result<Url> {
    validate_job_id(job_id)?;

    let mut url = Url::parse(base)
        .map_err(|e| ClientError::ParseError(format!("Invalid N8N_API URL {:?}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::ParseError(format!("N8N_API cannot take a path: {:?}", base)))?
        .pop_if_empty()
        .push("executions")
        .push(job_id);

    Ok(url)
}

impl UpstreamClient {
    /// Query the public status webhook for a job
    ///
    /// The job id travels as the `jobId` query parameter. A body that is not
    /// JSON is returned as a JSON string so the caller can still normalize it.
    pub async fn fetch_status_webhook(&self, job_id: &str) -> Result<Value> {
        let url = self
            .endpoints
            .status_webhook_url
            .as_deref()
            .ok_or(ClientError::NotConfigured("TARGET_STATUS_WEBHOOK"))?;

        tracing::debug!("Querying status webhook for job {}", job_id);

        let exchange = async {
            let response = self
                .client
                .get(url)
                .query(&[("jobId", job_id)])
                .header(ACCEPT, "application/json")
                .send()
                .await?;

            Ok::<_, ClientError>(Self::check_status(response).await?.text().await?)
        };

        let text = self.within_status_timeout(exchange).await?;

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    /// Fetch an execution record from the workflow-engine API
    ///
    /// The API key header is only sent when a key is configured.
    ///
    /// # Errors
    /// * [`ClientError::InvalidJobId`] for an id that is not a single path segment; no request is made
    /// * [`ClientError::Timeout`] when the status timeout expires
    pub async fn fetch_execution(&self, job_id: &str) -> Result<Value> {
        let base = self
            .endpoints
            .execution_api_url
            .as_deref()
            .ok_or(ClientError::NotConfigured("N8N_API"))?;

        let url = execution_url(base, job_id)?;
        tracing::debug!("Fetching execution {}", url);

        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(key) = &self.endpoints.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let exchange = async {
            let response = Self::check_status(request.send().await?).await?;

            response.json::<Value>().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse execution record: {}", e))
            })
        };

        self.within_status_timeout(exchange).await
    }

    async fn within_status_timeout<T>(&self, exchange: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.status_timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout(self.status_timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpstreamEndpoints;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_status_webhook_passes_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/webhook/status"))
            .and(query_param("jobId", "abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamEndpoints {
            status_webhook_url: Some(format!("{}/webhook/status", server.uri())),
            ..Default::default()
        });

        let value = client.fetch_status_webhook("abc123").await.unwrap();
        assert_eq!(value, json!({ "status": "running" }));
    }

    #[tokio::test]
    async fn test_status_webhook_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("still working"))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamEndpoints {
            status_webhook_url: Some(server.uri()),
            ..Default::default()
        });

        let value = client.fetch_status_webhook("abc123").await.unwrap();
        assert_eq!(value, json!("still working"));
    }

    #[tokio::test]
    async fn test_fetch_execution_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/executions/42"))
            .and(header("X-N8N-API-KEY", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "finished": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamEndpoints {
            execution_api_url: Some(format!("{}/api/v1/", server.uri())),
            api_key: Some("secret".to_string()),
            ..Default::default()
        });

        let value = client.fetch_execution("42").await.unwrap();
        assert_eq!(value["finished"], true);
    }

    #[tokio::test]
    async fn test_fetch_execution_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamEndpoints {
            execution_api_url: Some(server.uri()),
            ..Default::default()
        });

        let err = client.fetch_execution("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_status_sources_not_configured() {
        let client = UpstreamClient::new(UpstreamEndpoints::default());
        assert!(client.fetch_status_webhook("x").await.unwrap_err().is_not_configured());
        assert!(client.fetch_execution("x").await.unwrap_err().is_not_configured());
    }

    #[test]
    fn test_validate_job_id() {
        for id in ["42", "abc123", "exec-7_b", "a.b"] {
            assert!(validate_job_id(id).is_ok(), "{id} should be accepted");
        }
        for id in ["", ".", "..", "../credentials", "a/b", "a\\b", "x..y", "a\nb"] {
            assert!(validate_job_id(id).unwrap_err().is_invalid_job_id(), "{id:?} should be refused");
        }
    }

    #[test]
    fn test_execution_url_keeps_id_in_one_segment() {
        let url = execution_url("http://n8n.local/api/v1", "42").unwrap();
        assert_eq!(url.as_str(), "http://n8n.local/api/v1/executions/42");

        let url = execution_url("http://n8n.local", "a b?c#d").unwrap();
        assert_eq!(url.path(), "/executions/a%20b%3Fc%23d");
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn test_fetch_execution_refuses_path_traversal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "leaked": true })))
            .expect(0)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamEndpoints {
            execution_api_url: Some(format!("{}/api/v1", server.uri())),
            api_key: Some("secret".to_string()),
            ..Default::default()
        });

        for id in ["../credentials", "..%2Fcredentials", "..\\credentials"] {
            let err = client.fetch_execution(id).await.unwrap_err();
            assert!(err.is_invalid_job_id(), "{id}: {err}");
        }
    }

    #[tokio::test]
    async fn test_slow_status_sources_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "finished": false }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamEndpoints {
            status_webhook_url: Some(server.uri()),
            execution_api_url: Some(server.uri()),
            ..Default::default()
        })
        .with_status_timeout(Duration::from_millis(100));

        let started = std::time::Instant::now();
        assert!(client.fetch_execution("42").await.unwrap_err().is_timeout());
        assert!(client.fetch_status_webhook("42").await.unwrap_err().is_timeout());
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
