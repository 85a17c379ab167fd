//! Execution poller
//!
//! Re-polls the execution API for jobs the submission handler accepted and
//! records every answer in the cache. A job's task ends when the execution
//! leaves the in-flight set, when the safety ceiling expires, or when the
//! proxy shuts down.

use std::collections::HashMap;
use std::sync::Arc;

use relay_client::{UpstreamClient, validate_job_id};
use relay_core::domain::status;
use tokio::sync::Mutex;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::ExecutionCache;
use crate::service::status as status_service;

/// Timing of the per-job polling loop
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Delay between polls; the first poll happens one interval after start
    pub interval: Duration,
    /// Give up after this long; the cache keeps the last value seen
    pub ceiling: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            ceiling: Duration::from_secs(600),
        }
    }
}

/// How a polling task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

/// Supervises one polling task per in-flight job
#[derive(Clone)]
pub struct ExecutionPoller {
    upstream: Arc<UpstreamClient>,
    cache: ExecutionCache,
    settings: PollSettings,
    active: Arc<Mutex<HashMap<String, CancellationToken>>>,
    shutdown: CancellationToken,
}

impl ExecutionPoller {
    /// Creates a new poller; no task runs until a job is registered
    pub fn new(upstream: Arc<UpstreamClient>, cache: ExecutionCache, settings: PollSettings) -> Self {
        Self {
            upstream,
            cache,
            settings,
            active: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start polling a job in the background
    ///
    /// Returns `false` when the job is already being polled, the id cannot
    /// name an execution, or the poller has been shut down.
    pub async fn register(&self, job_id: &str) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }

        if let Err(e) = validate_job_id(job_id) {
            warn!("Not polling execution: {}", e);
            return false;
        }

        let token = {
            let mut active = self.active.lock().await;
            if active.contains_key(job_id) {
                debug!("Execution {} is already being polled", job_id);
                return false;
            }

            let token = self.shutdown.child_token();
            active.insert(job_id.to_string(), token.clone());
            token
        };

        info!(
            "Starting poll for execution {} (interval: {:?}, ceiling: {:?})",
            job_id, self.settings.interval, self.settings.ceiling
        );

        let poller = self.clone();
        let job_id = job_id.to_string();

        tokio::spawn(async move {
            let outcome = poller.poll_until_settled(&job_id, token).await;
            poller.active.lock().await.remove(&job_id);
            info!("Stopped polling execution {}: {:?}", job_id, outcome);
        });

        true
    }

    /// True while a task for `job_id` is running
    pub async fn is_polling(&self, job_id: &str) -> bool {
        self.active.lock().await.contains_key(job_id)
    }

    /// Number of running polling tasks
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Cancel every polling task
    pub fn shutdown(&self) {
        info!("Cancelling execution polling");
        self.shutdown.cancel();
    }

    /// Poll one job until it settles, times out, or `cancel` fires
    ///
    /// The ceiling and `cancel` also interrupt a request in flight. Poll
    /// errors are logged and retried on the next tick.
    pub async fn poll_until_settled(&self, job_id: &str, cancel: CancellationToken) -> PollOutcome {
        let deadline = Instant::now() + self.settings.ceiling;
        let mut ticker = time::interval_at(Instant::now() + self.settings.interval, self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = time::sleep_until(deadline) => return self.timed_out(job_id),
                _ = ticker.tick() => {}
            }

            debug!("Polling execution {}", job_id);

            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = time::sleep_until(deadline) => return self.timed_out(job_id),
                polled = status_service::refresh_execution(&self.upstream, &self.cache, job_id) => polled,
            };

            match polled {
                Ok(entry) if entry.is_in_flight() => {
                    debug!("Execution {} still {}", job_id, entry.status);
                }
                Ok(entry) if status::is_error(&entry.status) => {
                    warn!("Execution {} failed", job_id);
                    return PollOutcome::Failed;
                }
                Ok(_) => {
                    info!("Execution {} completed", job_id);
                    return PollOutcome::Completed;
                }
                Err(e) => {
                    warn!("Failed to poll execution {}: {:?}", job_id, e);
                }
            }
        }
    }

    fn timed_out(&self, job_id: &str) -> PollOutcome {
        warn!("Stopped polling {} after {:?}", job_id, self.settings.ceiling);
        PollOutcome::TimedOut
    }
}
