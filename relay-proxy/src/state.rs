//! Shared application state handed to every handler

use std::sync::Arc;

use relay_client::UpstreamClient;

use crate::cache::{ExecutionCache, ExecutionStore, InMemoryExecutionStore};
use crate::config::Config;
use crate::scheduler::{ExecutionPoller, PollSettings};

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub cache: ExecutionCache,
    pub poller: ExecutionPoller,
}

impl AppState {
    /// State backed by the in-process execution store
    pub fn new(config: &Config) -> Self {
        Self::with_store(config, Arc::new(InMemoryExecutionStore::new()))
    }

    /// State backed by the given execution store
    pub fn with_store(config: &Config, store: Arc<dyn ExecutionStore>) -> Self {
        let upstream = Arc::new(
            UpstreamClient::new(config.endpoints())
                .with_forward_timeout(config.forward_timeout)
                .with_status_timeout(config.status_timeout),
        );
        let cache = ExecutionCache::new(store);
        let poller = ExecutionPoller::new(
            Arc::clone(&upstream),
            cache.clone(),
            PollSettings {
                interval: config.poll_interval,
                ceiling: config.poll_ceiling,
            },
        );

        Self {
            upstream,
            cache,
            poller,
        }
    }
}
