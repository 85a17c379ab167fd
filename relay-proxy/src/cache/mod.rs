//! Execution cache
//!
//! Last known status per upstream execution, behind an injected
//! [`ExecutionStore`]. Writes carry a sequence number issued when the
//! corresponding upstream fetch *started*; the store keeps only the newest,
//! so a slow poll that lands late cannot roll an entry back.

mod memory;

pub use memory::InMemoryExecutionStore;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use relay_core::ExecutionCacheEntry;
use thiserror::Error;

/// Errors raised by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Execution store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value storage for execution entries
///
/// Implementations may be process-local or backed by a shared cache so
/// several proxy instances see the same status.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Fetch the entry for an execution id
    async fn get(&self, execution_id: &str) -> Result<Option<ExecutionCacheEntry>, StoreError>;

    /// Store `entry` unless an entry with a higher sequence is already present
    ///
    /// Returns whether the write was applied.
    async fn set(&self, entry: ExecutionCacheEntry) -> Result<bool, StoreError>;

    /// Remove the entry for an execution id
    async fn delete(&self, execution_id: &str) -> Result<(), StoreError>;
}

/// Shared handle over a store plus the sequence counter that orders writes
#[derive(Clone)]
pub struct ExecutionCache {
    store: Arc<dyn ExecutionStore>,
    sequence: Arc<AtomicU64>,
}

impl ExecutionCache {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        Self {
            store,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cache backed by a process-local map
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryExecutionStore::new()))
    }

    /// Issue the next write sequence number
    ///
    /// Call before starting the upstream request whose answer will be stored.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn get(&self, execution_id: &str) -> Result<Option<ExecutionCacheEntry>, StoreError> {
        self.store.get(execution_id).await
    }

    /// Record an entry and return whatever is current afterwards
    ///
    /// When the write is rejected as stale the newer stored entry is returned.
    pub async fn record(&self, entry: ExecutionCacheEntry) -> Result<ExecutionCacheEntry, StoreError> {
        if self.store.set(entry.clone()).await? {
            return Ok(entry);
        }

        tracing::debug!(
            "Discarding stale status for execution {} (sequence {})",
            entry.execution_id,
            entry.sequence
        );

        Ok(self.store.get(&entry.execution_id).await?.unwrap_or(entry))
    }

    pub async fn remove(&self, execution_id: &str) -> Result<(), StoreError> {
        self.store.delete(execution_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::normalize;
    use serde_json::json;

    fn entry(status: &str, sequence: u64) -> ExecutionCacheEntry {
        let payload = normalize(json!({ "executionId": "abc", "status": status }));
        let mut entry = ExecutionCacheEntry::from_payload("abc", &payload, 0);
        entry.sequence = sequence;
        entry
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let cache = ExecutionCache::in_memory();
        let first = cache.next_sequence();
        let second = cache.next_sequence();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_record_rejects_stale_write() {
        let cache = ExecutionCache::in_memory();

        cache.record(entry("completed", 5)).await.unwrap();
        let current = cache.record(entry("processing", 3)).await.unwrap();

        assert_eq!(current.status, "completed");
        assert_eq!(cache.get("abc").await.unwrap().unwrap().status, "completed");
    }

    #[tokio::test]
    async fn test_record_accepts_newer_write() {
        let cache = ExecutionCache::in_memory();

        cache.record(entry("processing", 1)).await.unwrap();
        let current = cache.record(entry("completed", 2)).await.unwrap();

        assert_eq!(current.status, "completed");
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = ExecutionCache::in_memory();
        cache.record(entry("processing", 1)).await.unwrap();
        cache.remove("abc").await.unwrap();
        assert!(cache.get("abc").await.unwrap().is_none());
    }
}
