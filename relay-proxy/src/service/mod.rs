//! Service Module
//!
//! Business logic layer for the proxy.
//! Services sit between the HTTP handlers and the upstream client/cache.

pub mod result;
pub mod status;
pub mod submission;

// Re-export for convenience
pub use result as result_service;
pub use status as status_service;
pub use submission as submission_service;
