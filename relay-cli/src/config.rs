//! Configuration module
//!
//! Handles CLI configuration including the proxy URL and polling cadence.

use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the relay proxy
    pub proxy_url: String,

    /// Delay between status polls while waiting
    pub poll_interval: Duration,

    /// Give up waiting after this long
    pub wait_timeout: Duration,
}
