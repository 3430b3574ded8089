use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use agentflow_core::{Agent, AgentId, AgentNature, Message, MessageRole, Tenant, TenantId, Thread, ThreadId};

use crate::error::{Result, StoreError};

/// Persistence boundary the pipeline and gateway consume. A real deployment
/// backs this with a transactional database; the in-memory implementation
/// here exists for tests and the demo binary and commits every mutation
/// immediately (there is nothing to roll back).
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_thread(&self, thread_id: &ThreadId) -> Result<Thread>;

    /// Adds `agent_id` to the thread's participant set if not already present.
    /// Rejects when the agent is neither platform-scoped nor tenant-matching.
    async fn ensure_agent_in_thread(&self, thread_id: &ThreadId, agent_id: &AgentId) -> Result<()>;

    async fn get_history(&self, thread_id: &ThreadId) -> Result<Vec<Message>>;

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        agent_id: &AgentId,
        role: MessageRole,
        content: &str,
        metadata: Value,
    ) -> Result<Message>;

    async fn get_system_agent_for_tenant(&self, tenant_id: &TenantId) -> Result<Agent>;

    async fn get_agent(&self, agent_id: &AgentId) -> Result<Agent>;

    async fn create_thread(&self, tenant_id: TenantId, title: Option<String>, metadata: Value) -> Result<Thread>;

    async fn delete_thread(&self, thread_id: &ThreadId) -> Result<()>;
}

/// DashMap-backed reference implementation. Guards match the spec's shared
/// resource model: per-thread state lives behind its own entry, the map
/// itself only locked for the insert/lookup, never for the mutation.
#[derive(Default)]
pub struct InMemoryStore {
    tenants: DashMap<TenantId, Tenant>,
    agents: DashMap<AgentId, Agent>,
    threads: DashMap<ThreadId, Thread>,
    messages: DashMap<ThreadId, Vec<Message>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_tenant(&self, tenant: Tenant) {
        self.tenants.insert(tenant.id.clone(), tenant);
    }

    pub fn seed_agent(&self, agent: Agent) {
        self.agents.insert(agent.id.clone(), agent);
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_thread(&self, thread_id: &ThreadId) -> Result<Thread> {
        let thread = self
            .threads
            .get(thread_id)
            .map(|t| t.clone())
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.as_str().to_string()))?;

        // Soft-deleted threads are excluded from listings and stream
        // subscriptions (spec.md §3) — treat them as not found rather than
        // exposing a tombstoned row to callers.
        if thread.is_deleted() {
            return Err(StoreError::ThreadNotFound(thread_id.as_str().to_string()));
        }

        Ok(thread)
    }

    async fn ensure_agent_in_thread(&self, thread_id: &ThreadId, agent_id: &AgentId) -> Result<()> {
        let agent = self.get_agent(agent_id).await?;
        let mut thread = self.get_thread(thread_id).await?;

        let authorized = agent.is_platform_scoped() || agent.tenant_id.as_ref() == Some(&thread.tenant_id);
        if !authorized {
            return Err(StoreError::AgentNotAuthorized {
                agent_id: agent_id.as_str().to_string(),
                tenant_id: thread.tenant_id.as_str().to_string(),
            });
        }

        thread.add_agent(agent_id.clone());
        self.threads.insert(thread_id.clone(), thread);
        Ok(())
    }

    async fn get_history(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        self.get_thread(thread_id).await?;
        Ok(self
            .messages
            .get(thread_id)
            .map(|m| m.clone())
            .unwrap_or_default())
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        agent_id: &AgentId,
        role: MessageRole,
        content: &str,
        metadata: Value,
    ) -> Result<Message> {
        self.get_thread(thread_id).await?;

        let message = Message::new(thread_id.clone(), agent_id.clone(), role, content.to_string(), metadata);
        self.messages
            .entry(thread_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn get_system_agent_for_tenant(&self, tenant_id: &TenantId) -> Result<Agent> {
        self.agents
            .iter()
            .find(|entry| {
                let agent = entry.value();
                agent.nature == AgentNature::System && agent.tenant_id.as_ref() == Some(tenant_id)
            })
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NoSystemAgent(tenant_id.as_str().to_string()))
    }

    async fn get_agent(&self, agent_id: &AgentId) -> Result<Agent> {
        self.agents
            .get(agent_id)
            .map(|a| a.clone())
            .ok_or_else(|| StoreError::AgentNotFound(agent_id.as_str().to_string()))
    }

    async fn create_thread(&self, tenant_id: TenantId, title: Option<String>, metadata: Value) -> Result<Thread> {
        let mut thread = Thread::new(tenant_id, title.unwrap_or_default());
        if let Value::Object(map) = metadata {
            thread.metadata = map.into_iter().collect::<HashMap<_, _>>();
        }
        self.threads.insert(thread.id.clone(), thread.clone());
        Ok(thread)
    }

    async fn delete_thread(&self, thread_id: &ThreadId) -> Result<()> {
        let mut thread = self.get_thread(thread_id).await?;
        thread.timestamps.deleted_at = Some(chrono::Utc::now());
        self.threads.insert(thread_id.clone(), thread);
        Ok(())
    }
}
