//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relay_client::ClientError;
use serde_json::json;

use crate::cache::StoreError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    MethodNotAllowed,
    /// A required upstream URL is missing (500 with a hint)
    NotConfigured(&'static str),
    GatewayTimeout,
    /// Upstream answered non-2xx; relayed with the upstream status
    Upstream {
        context: Option<&'static str>,
        status: u16,
        message: String,
    },
    /// The workflow reported an error status
    Workflow(String),
    /// Network or other failure talking to the upstream
    Proxy(String),
    InternalError(String),
}

impl ApiError {
    /// Map an upstream client failure, labelling relayed HTTP errors with `context`
    pub fn from_client(err: ClientError, context: Option<&'static str>) -> Self {
        match err {
            ClientError::NotConfigured(name) => ApiError::NotConfigured(name),
            ClientError::ApiError { status, message } => ApiError::Upstream {
                context,
                status,
                message,
            },
            err if err.is_timeout() => ApiError::GatewayTimeout,
            err => ApiError::Proxy(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method not allowed" }),
            ),
            ApiError::NotConfigured(name) => {
                tracing::error!("{} not configured", name);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": format!("{} not configured", name),
                        "message": format!("Set {} to the public n8n webhook URL.", name),
                    }),
                )
            }
            ApiError::GatewayTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({
                    "error": "Gateway Timeout",
                    "message": "Request took too long to complete",
                }),
            ),
            ApiError::Upstream {
                context,
                status,
                message,
            } => {
                tracing::error!("Upstream error: {} {}", status, message);
                let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = match context {
                    Some(context) => json!({
                        "error": context,
                        "status": status,
                        "message": message,
                    }),
                    None => json!({ "error": message }),
                };
                (code, body)
            }
            ApiError::Workflow(msg) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Workflow error", "message": msg }),
            ),
            ApiError::Proxy(msg) => {
                tracing::error!("Proxy error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Proxy error", "message": msg }),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
