use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use agentflow_core::ThreadId;

use crate::error::Result;

/// Persisted pipeline state keyed by thread id, enabling resumable graph
/// execution across pipeline runs. `setup` is idempotent so callers can
/// invoke it on every run without checking whether it already ran.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn setup(&self, thread_id: &ThreadId) -> Result<()>;

    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Value>>;

    async fn save(&self, thread_id: &ThreadId, checkpoint: Value) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryCheckpointStore {
    initialized: DashMap<String, ()>,
    checkpoints: DashMap<String, Value>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn setup(&self, thread_id: &ThreadId) -> Result<()> {
        self.initialized.entry(thread_id.as_str().to_string()).or_insert(());
        Ok(())
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Value>> {
        Ok(self.checkpoints.get(thread_id.as_str()).map(|v| v.clone()))
    }

    async fn save(&self, thread_id: &ThreadId, checkpoint: Value) -> Result<()> {
        self.checkpoints.insert(thread_id.as_str().to_string(), checkpoint);
        Ok(())
    }
}
