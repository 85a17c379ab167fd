//! Relay Proxy
//!
//! HTTP relay between the browser form and the upstream workflow webhook.
//! Forwards submissions, answers status polls, and keeps a cache of the
//! last known status of every execution it has seen.

pub mod api;
pub mod cache;
pub mod config;
pub mod scheduler;
pub mod service;
pub mod state;

pub use config::Config;
pub use state::AppState;
