//! Proxy configuration
//!
//! Defines the upstream endpoints, listen address, and the timeouts that
//! govern forwarding and background polling.

use std::time::Duration;

use relay_client::UpstreamEndpoints;

/// Proxy configuration
///
/// All timeouts and intervals are configurable to allow tuning for
/// different deployment scenarios (local dev against a test workflow vs.
/// production analyses that take minutes).
#[derive(Debug, Clone)]
pub struct Config {
    /// Submission webhook URL; requests fail with a configuration error without it
    pub webhook_url: Option<String>,

    /// Public status webhook queried with `?jobId=`
    pub status_webhook_url: Option<String>,

    /// Workflow-engine API base (e.g., "https://n8n.example.com/api/v1")
    pub execution_api_url: Option<String>,

    /// Workflow-engine API key
    pub api_key: Option<String>,

    /// Interface to listen on
    pub bind_host: String,

    /// Listen port
    pub port: u16,

    /// Hard limit for one forwarded submission
    pub forward_timeout: Duration,

    /// Hard limit for one status webhook or execution API call
    pub status_timeout: Duration,

    /// How often a background task re-polls an in-flight execution
    pub poll_interval: Duration,

    /// How long a background task may poll before giving up
    pub poll_ceiling: Duration,
}

impl Config {
    /// Creates a new configuration with defaults and no upstream configured
    pub fn new() -> Self {
        Self {
            webhook_url: None,
            status_webhook_url: None,
            execution_api_url: None,
            api_key: None,
            bind_host: "0.0.0.0".to_string(),
            port: 3001,
            forward_timeout: Duration::from_secs(360), // 6 minutes
            status_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            poll_ceiling: Duration::from_secs(600), // 10 minutes
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - TARGET_WEBHOOK (submission webhook; requests fail without it)
    /// - TARGET_STATUS_WEBHOOK (optional)
    /// - N8N_API, N8N_API_KEY (optional)
    /// - PORT (optional, default: 3001)
    /// - BIND_HOST (optional, default: 0.0.0.0)
    /// - FORWARD_TIMEOUT_SECS (optional, default: 360)
    /// - STATUS_TIMEOUT_SECS (optional, default: 30)
    /// - POLL_INTERVAL_SECS (optional, default: 5)
    /// - POLL_CEILING_SECS (optional, default: 600)
    ///
    /// Empty values count as unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::new();

        let port = match env_var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got {:?}", value))?,
            None => defaults.port,
        };

        Ok(Self {
            webhook_url: env_var("TARGET_WEBHOOK"),
            status_webhook_url: env_var("TARGET_STATUS_WEBHOOK"),
            execution_api_url: env_var("N8N_API"),
            api_key: env_var("N8N_API_KEY"),
            bind_host: env_var("BIND_HOST").unwrap_or(defaults.bind_host),
            port,
            forward_timeout: env_secs("FORWARD_TIMEOUT_SECS").unwrap_or(defaults.forward_timeout),
            status_timeout: env_secs("STATUS_TIMEOUT_SECS").unwrap_or(defaults.status_timeout),
            poll_interval: env_secs("POLL_INTERVAL_SECS").unwrap_or(defaults.poll_interval),
            poll_ceiling: env_secs("POLL_CEILING_SECS").unwrap_or(defaults.poll_ceiling),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("TARGET_WEBHOOK", &self.webhook_url),
            ("TARGET_STATUS_WEBHOOK", &self.status_webhook_url),
            ("N8N_API", &self.execution_api_url),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("{} must start with http:// or https://", name);
                }
            }
        }

        if self.forward_timeout.is_zero() {
            anyhow::bail!("forward_timeout must be greater than 0");
        }

        if self.status_timeout.is_zero() {
            anyhow::bail!("status_timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.poll_ceiling < self.poll_interval {
            anyhow::bail!("poll_ceiling must not be shorter than poll_interval");
        }

        Ok(())
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Upstream endpoints for the HTTP client
    pub fn endpoints(&self) -> UpstreamEndpoints {
        UpstreamEndpoints {
            webhook_url: self.webhook_url.clone(),
            status_webhook_url: self.status_webhook_url.clone(),
            execution_api_url: self.execution_api_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_var(name)
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
