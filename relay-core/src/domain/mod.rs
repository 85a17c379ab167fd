//! Core domain types
//!
//! These types are shared between the proxy (which caches and serves them)
//! and the CLI (which reads them back from the proxy).

pub mod artifact;
pub mod job;
pub mod status;
