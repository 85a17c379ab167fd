//! Relay Core
//!
//! Core types and pure logic for the SEO feedback relay.
//!
//! This crate contains:
//! - Domain types: job status vocabulary, normalized payloads, cache entries
//! - Normalizer: maps whatever the upstream webhook returned onto one shape
//! - Extractor: finds an embedded PDF or download link inside a result
//! - DTOs: response bodies shared by the proxy and the CLI

pub mod domain;
pub mod dto;
pub mod extract;
pub mod normalize;

pub use domain::artifact::Artifact;
pub use domain::job::{ExecutionCacheEntry, NormalizedJobPayload};
pub use extract::{extract_artifact, find_download_url};
pub use normalize::{find_job_id, normalize, normalize_execution, normalize_text};
