pub mod chat;
pub mod checkpoint;
pub mod error;
pub mod secrets;
pub mod store;

pub use chat::{
    ChatMessage, ChatModel, ChatModelError, ChatRequest, ChatResponse, ChatRole, ChatStreamEvent,
    TokenUsage, Tool, ToolCall, ToolDefinition,
};
pub use checkpoint::{CheckpointStore, InMemoryCheckpointStore};
pub use error::{Result, StoreError};
pub use secrets::{InMemorySecretsManager, SecretsManager};
pub use store::{InMemoryStore, Store};

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_core::{Agent, AgentId, AgentNature, MessageRole, Tenant, TenantId};
    use serde_json::json;

    fn seeded_store() -> (InMemoryStore, TenantId, AgentId) {
        let store = InMemoryStore::new();
        let tenant_id = TenantId::new();
        store.seed_tenant(Tenant {
            id: tenant_id.clone(),
            name: "acme".into(),
            timestamps: agentflow_core::EntityTimestamps::new(),
        });

        let system_agent = Agent {
            id: AgentId::new(),
            tenant_id: Some(tenant_id.clone()),
            first_name: "Assistant".into(),
            second_name: None,
            email: None,
            nature: AgentNature::System,
            origin: None,
            timestamps: agentflow_core::EntityTimestamps::new(),
        };
        let agent_id = system_agent.id.clone();
        store.seed_agent(system_agent);

        (store, tenant_id, agent_id)
    }

    #[tokio::test]
    async fn create_and_fetch_thread_roundtrips() {
        let (store, tenant_id, _) = seeded_store();
        let thread = store
            .create_thread(tenant_id, Some("hi".into()), json!({}))
            .await
            .unwrap();

        let fetched = store.get_thread(&thread.id).await.unwrap();
        assert_eq!(fetched.id, thread.id);
    }

    #[tokio::test]
    async fn ensure_agent_in_thread_rejects_cross_tenant_agent() {
        let (store, tenant_id, _) = seeded_store();
        let other_tenant = TenantId::new();
        let thread = store.create_thread(tenant_id, None, json!({})).await.unwrap();

        let foreign_agent = Agent {
            id: AgentId::new(),
            tenant_id: Some(other_tenant),
            first_name: "Intruder".into(),
            second_name: None,
            email: None,
            nature: AgentNature::Human,
            origin: None,
            timestamps: agentflow_core::EntityTimestamps::new(),
        };
        let foreign_id = foreign_agent.id.clone();
        store.seed_agent(foreign_agent);

        let err = store
            .ensure_agent_in_thread(&thread.id, &foreign_id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AgentNotAuthorized { .. }));
    }

    #[tokio::test]
    async fn create_message_appends_to_history_in_order() {
        let (store, tenant_id, agent_id) = seeded_store();
        let thread = store.create_thread(tenant_id, None, json!({})).await.unwrap();

        store
            .create_message(&thread.id, &agent_id, MessageRole::User, "hi", json!({}))
            .await
            .unwrap();
        store
            .create_message(&thread.id, &agent_id, MessageRole::Assistant, "hello", json!({}))
            .await
            .unwrap();

        let history = store.get_history(&thread.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn checkpoint_setup_is_idempotent() {
        let store = InMemoryCheckpointStore::new();
        let thread_id = agentflow_core::ThreadId::new();
        store.setup(&thread_id).await.unwrap();
        store.setup(&thread_id).await.unwrap();
        assert!(store.load(&thread_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn secrets_manager_returns_not_found_without_fallback() {
        let secrets = InMemorySecretsManager::new();
        let tenant_id = TenantId::new();
        let err = secrets.get(&tenant_id, "openai").await.unwrap_err();
        assert!(matches!(err, StoreError::SecretNotFound { .. }));
    }
}
