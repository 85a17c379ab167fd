//! Submission webhook

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::UpstreamClient;
use crate::error::{ClientError, Result};

/// A successful webhook response, body fully read
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: u16,
    /// Declared content type, `application/octet-stream` when absent
    pub content_type: String,
    pub body: Vec<u8>,
}

impl WebhookResponse {
    /// True when the upstream declared a JSON body
    pub fn is_json(&self) -> bool {
        self.content_type.contains("application/json")
    }
}

impl UpstreamClient {
    // =============================================================================
    // Job Submission
    // =============================================================================

    /// Forward a submission to the upstream webhook
    ///
    /// The body is re-serialized and POSTed with JSON content negotiation
    /// that also accepts a direct PDF answer. The whole exchange, including
    /// reading the body, must finish within the forward timeout.
    ///
    /// # Errors
    /// * [`ClientError::NotConfigured`] without a webhook URL; no request is made
    /// * [`ClientError::Timeout`] when the forward timeout expires
    /// * [`ClientError::ApiError`] carrying the upstream status and body text
    pub async fn submit(&self, body: &Value) -> Result<WebhookResponse> {
        let url = self
            .endpoints
            .webhook_url
            .as_deref()
            .ok_or(ClientError::NotConfigured("TARGET_WEBHOOK"))?;

        tracing::debug!("Forwarding submission to {}", url);

        let exchange = async {
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json, application/pdf")
                .body(body.to_string())
                .send()
                .await?;

            let response = Self::check_status(response).await?;

            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("application/octet-stream")
                .to_string();
            let body = response.bytes().await?.to_vec();

            Ok::<_, ClientError>(WebhookResponse {
                status,
                content_type,
                body,
            })
        };

        tokio::time::timeout(self.forward_timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout(self.forward_timeout))?
    }
}
