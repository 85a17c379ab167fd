//! API client module
//!
//! HTTP client for communicating with the relay proxy.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, header};
use relay_core::ExecutionCacheEntry;
use relay_core::dto::job::{SubmissionAccepted, SubmissionCompleted};
use serde_json::Value;

/// What the proxy answered to a submission
#[derive(Debug)]
pub enum Submission {
    /// The workflow started an asynchronous job
    Accepted(SubmissionAccepted),
    /// The workflow answered with a final result
    Completed(SubmissionCompleted),
    /// The workflow answered with a file, relayed as-is
    File { content_type: String, bytes: Vec<u8> },
}

/// HTTP client for the relay proxy
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the relay proxy
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Submit a site for analysis
    ///
    /// # Arguments
    /// * `body` - The form body, typically `{ url, email? }`
    pub async fn submit(&self, body: &Value) -> Result<Submission> {
        let url = format!("{}/seo-feedback", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send submission request")?;

        let response = Self::check_status(response).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .context("Failed to read submission response")?
            .to_vec();

        if !content_type.contains("application/json") {
            return Ok(Submission::File {
                content_type,
                bytes,
            });
        }

        if status == StatusCode::ACCEPTED {
            let accepted =
                serde_json::from_slice(&bytes).context("Failed to parse accepted job")?;
            return Ok(Submission::Accepted(accepted));
        }

        match serde_json::from_slice::<SubmissionCompleted>(&bytes) {
            Ok(completed) => Ok(Submission::Completed(completed)),
            // Upstream JSON the proxy could not interpret is relayed unchanged
            Err(_) => Ok(Submission::File {
                content_type,
                bytes,
            }),
        }
    }

    /// Get the current status of a job
    ///
    /// # Arguments
    /// * `job_id` - The job / execution id returned at submission
    pub async fn get_status(&self, job_id: &str) -> Result<ExecutionCacheEntry> {
        let url = format!("{}/api/seo-feedback-status", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("jobId", job_id)])
            .send()
            .await
            .context("Failed to send status request")?;

        self.handle_response(response).await
    }

    /// Check that the proxy is up
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send health request")?;

        let response = Self::check_status(response).await?;
        response.text().await.context("Failed to read health response")
    }

    /// Handle API response and deserialize JSON
    ///
    /// # Arguments
    /// * `response` - The HTTP response
    ///
    /// # Returns
    /// The deserialized response body
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        Self::check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse response JSON")
    }

    /// Turn a non-success response into an error carrying the proxy's message
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Request failed with status {}: {}", status, describe_error(&error_text));
    }
}

/// Human-readable form of a proxy error body
fn describe_error(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    match (
        value.get("error").and_then(Value::as_str),
        value.get("message").and_then(Value::as_str),
    ) {
        (Some(error), Some(message)) => format!("{} ({})", error, message),
        (Some(error), None) => error.to_string(),
        _ => body.to_string(),
    }
}
