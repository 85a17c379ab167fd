//! Cross-origin handling
//!
//! The form is served from another origin, so every feedback route answers
//! preflights itself and every response allows any origin.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::error::ApiError;

pub const ALLOW_METHODS: &str = "GET,POST,OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type,Accept";
pub const MAX_AGE: &str = "86400";

/// OPTIONS on any feedback route
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
            (header::ACCESS_CONTROL_MAX_AGE, MAX_AGE),
        ],
    )
}

/// Any other method on a feedback route
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Unknown paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Adds `Access-Control-Allow-Origin: *` to responses that lack it
pub fn allow_any_origin() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    )
}
