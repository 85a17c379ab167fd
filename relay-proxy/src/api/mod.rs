//! API Module
//!
//! HTTP API layer for the proxy.
//! Each submodule handles endpoints for a specific concern.

pub mod cors;
pub mod error;
pub mod feedback;
pub mod health;
pub mod status;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Submission endpoints
        .route(
            "/seo-feedback",
            post(feedback::submit_feedback)
                .options(cors::preflight)
                .fallback(cors::method_not_allowed),
        )
        .route(
            "/api/seo-feedback",
            post(feedback::submit_feedback)
                .options(cors::preflight)
                .fallback(cors::method_not_allowed),
        )
        .route(
            "/seo-feedback/result",
            post(feedback::push_result)
                .options(cors::preflight)
                .fallback(cors::method_not_allowed),
        )
        // Status endpoints
        .route(
            "/seo-feedback/status",
            get(status::get_status_by_query)
                .options(cors::preflight)
                .fallback(cors::method_not_allowed),
        )
        .route(
            "/seo-feedback/status/{job_id}",
            get(status::get_status)
                .options(cors::preflight)
                .fallback(cors::method_not_allowed),
        )
        .route(
            "/api/seo-feedback-status",
            get(status::get_status_by_query)
                .options(cors::preflight)
                .fallback(cors::method_not_allowed),
        )
        .fallback(cors::not_found)
        // Add state and middleware
        .with_state(state)
        .layer(cors::allow_any_origin())
        .layer(TraceLayer::new_for_http())
}
