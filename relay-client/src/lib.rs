//! Relay Upstream Client
//!
//! A small, typed HTTP client for the workflow-automation endpoints the
//! relay forwards to:
//! - the submission webhook that starts an analysis
//! - an optional public status webhook keyed by job id
//! - an optional workflow-engine execution API
//!
//! # Example
//!
//! ```no_run
//! use relay_client::{UpstreamClient, UpstreamEndpoints};
//! use serde_json::json;
//!
//! # async fn example() -> relay_client::Result<()> {
//! let client = UpstreamClient::new(UpstreamEndpoints {
//!     webhook_url: Some("https://n8n.example.com/webhook/seo".to_string()),
//!     ..Default::default()
//! });
//!
//! let response = client.submit(&json!({ "url": "https://example.com" })).await?;
//! println!("upstream answered {} ({})", response.status, response.content_type);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod status;
mod webhook;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use status::validate_job_id;
pub use webhook::WebhookResponse;

use std::time::Duration;

use reqwest::Client;

/// Default budget for the submission call; upstream analyses are slow
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(360);

/// Default budget for one status webhook or execution API call
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream endpoint locations
///
/// Every endpoint is optional here; each operation reports
/// [`ClientError::NotConfigured`] when the endpoint it needs is missing.
#[derive(Debug, Clone, Default)]
pub struct UpstreamEndpoints {
    /// Submission webhook (`TARGET_WEBHOOK`)
    pub webhook_url: Option<String>,
    /// Public status webhook (`TARGET_STATUS_WEBHOOK`)
    pub status_webhook_url: Option<String>,
    /// Workflow-engine API base (`N8N_API`)
    pub execution_api_url: Option<String>,
    /// Workflow-engine API key (`N8N_API_KEY`)
    pub api_key: Option<String>,
}

/// HTTP client for the upstream workflow endpoints
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    endpoints: UpstreamEndpoints,
    /// Hard limit for the submission call, covering headers and body
    forward_timeout: Duration,
    /// Hard limit for a status lookup against either status source
    status_timeout: Duration,
    client: Client,
}

impl UpstreamClient {
    /// Create a new upstream client with the default forward timeout
    pub fn new(endpoints: UpstreamEndpoints) -> Self {
        Self::with_client(endpoints, Client::new())
    }

    /// Create a new upstream client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(endpoints: UpstreamEndpoints, client: Client) -> Self {
        Self {
            endpoints: endpoints.trimmed(),
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            client,
        }
    }

    /// Override the submission timeout
    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }

    /// Override the status lookup timeout
    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    pub fn endpoints(&self) -> &UpstreamEndpoints {
        &self.endpoints
    }

    pub fn forward_timeout(&self) -> Duration {
        self.forward_timeout
    }

    pub fn status_timeout(&self) -> Duration {
        self.status_timeout
    }

    /// True when the execution API is configured
    pub fn has_execution_api(&self) -> bool {
        self.endpoints.execution_api_url.is_some()
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-success response into [`ClientError::ApiError`]
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

impl UpstreamEndpoints {
    /// Drop blank values and trailing slashes from the API base
    fn trimmed(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            webhook_url: clean(self.webhook_url),
            status_webhook_url: clean(self.status_webhook_url),
            execution_api_url: clean(self.execution_api_url)
                .map(|v| v.trim_end_matches('/').to_string()),
            api_key: clean(self.api_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = UpstreamClient::new(UpstreamEndpoints::default());
        assert_eq!(client.forward_timeout(), DEFAULT_FORWARD_TIMEOUT);
        assert_eq!(client.status_timeout(), DEFAULT_STATUS_TIMEOUT);
        assert!(!client.has_execution_api());
    }

    #[test]
    fn test_blank_endpoints_are_unset() {
        let client = UpstreamClient::new(UpstreamEndpoints {
            webhook_url: Some("   ".to_string()),
            execution_api_url: Some("http://n8n.local/api/v1/".to_string()),
            api_key: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(client.endpoints().webhook_url, None);
        assert_eq!(client.endpoints().api_key, None);
        assert_eq!(
            client.endpoints().execution_api_url.as_deref(),
            Some("http://n8n.local/api/v1")
        );
        assert!(client.has_execution_api());
    }

    #[test]
    fn test_client_with_custom_timeout() {
        let client = UpstreamClient::with_client(UpstreamEndpoints::default(), Client::new())
            .with_forward_timeout(Duration::from_secs(5))
            .with_status_timeout(Duration::from_secs(2));
        assert_eq!(client.forward_timeout(), Duration::from_secs(5));
        assert_eq!(client.status_timeout(), Duration::from_secs(2));
    }
}
