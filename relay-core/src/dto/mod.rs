//! Data Transfer Objects
//!
//! Response bodies produced by the proxy and consumed by the CLI.

pub mod job;
