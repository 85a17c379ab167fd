//! In-process execution store
//!
//! Entries live for the lifetime of the process. Suitable for a single
//! proxy instance; job status can always be re-derived from upstream.

use std::collections::HashMap;

use async_trait::async_trait;
use relay_core::ExecutionCacheEntry;
use tokio::sync::RwLock;

use super::{ExecutionStore, StoreError};

/// [`ExecutionStore`] backed by a `HashMap`
#[derive(Default)]
pub struct InMemoryExecutionStore {
    entries: RwLock<HashMap<String, ExecutionCacheEntry>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn get(&self, execution_id: &str) -> Result<Option<ExecutionCacheEntry>, StoreError> {
        Ok(self.entries.read().await.get(execution_id).cloned())
    }

    async fn set(&self, entry: ExecutionCacheEntry) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.get(&entry.execution_id) {
            if existing.sequence > entry.sequence {
                return Ok(false);
            }
        }

        entries.insert(entry.execution_id.clone(), entry);
        Ok(true)
    }

    async fn delete(&self, execution_id: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(execution_id);
        Ok(())
    }
}
