//! Runtime Service (C6) — spec.md §4.4.
//!
//! Loads history, resolves model credentials, compiles the graph (C5) bound
//! to the thread's checkpoint, and runs it one-shot (`process`) or streaming
//! (`stream`). `process_and_save` additionally persists the resulting
//! assistant message, mirroring `AgentRuntime`'s role in the teacher as the
//! single seam between provider/prompt plumbing and the gateway.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{info, warn};

use agentflow_core::{AgentId, Message, MessageRole, TenantId, ThreadId};
use agentflow_graph::{CompiledGraph, GraphState};
use agentflow_pipeline::nodes::{self, cost_tracker};
use agentflow_pipeline::{build_graph, PipelineDeps, PipelineState, PipelineTunables};
use agentflow_store::{ChatMessage, ChatModel, ChatRole, CheckpointStore, SecretsManager, Store, Tool};

#[cfg(feature = "hooks")]
use agentflow_hooks::HookEngine;

use crate::credentials;
use crate::error::{Result, RuntimeError};
use crate::event::RuntimeEvent;
use crate::providers::OpenAiChatModel;

/// Binds the external collaborators (§6) to the compiled pipeline graph.
/// One instance is created at startup and shared via dependency injection —
/// the same "process-wide, injected, no hidden globals" posture spec.md §9
/// asks of the queue manager.
pub struct AgentRuntimeService {
    store: Arc<dyn Store>,
    checkpoints: Arc<dyn CheckpointStore>,
    secrets: Arc<dyn SecretsManager>,
    tools: Vec<Arc<dyn Tool>>,
    tunables: PipelineTunables,
    #[cfg(feature = "hooks")]
    hooks: Option<Arc<HookEngine>>,
}

impl AgentRuntimeService {
    pub fn new(
        store: Arc<dyn Store>,
        checkpoints: Arc<dyn CheckpointStore>,
        secrets: Arc<dyn SecretsManager>,
    ) -> Self {
        Self {
            store,
            checkpoints,
            secrets,
            tools: Vec::new(),
            tunables: PipelineTunables::default(),
            #[cfg(feature = "hooks")]
            hooks: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tunables(mut self, tunables: PipelineTunables) -> Self {
        self.tunables = tunables;
        self
    }

    #[cfg(feature = "hooks")]
    pub fn with_hooks(mut self, hooks: Arc<HookEngine>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Loads history, resolves credentials, and compiles a graph bound to
    /// this thread's checkpoint. Shared setup for `process` and `stream`.
    async fn prepare(
        &self,
        thread_id: &ThreadId,
        tenant_id: &TenantId,
        user_messages: Vec<String>,
    ) -> Result<(CompiledGraph<PipelineState>, PipelineState)> {
        self.checkpoints.setup(thread_id).await.map_err(RuntimeError::from)?;

        let history = self.store.get_history(thread_id).await.map_err(RuntimeError::from)?;
        let turns: Vec<ChatMessage> = history.iter().map(to_chat_turn).collect();

        let checkpoint = self
            .checkpoints
            .load(thread_id)
            .await
            .map_err(RuntimeError::from)?
            .and_then(|value| match serde_json::from_value::<Vec<ChatMessage>>(value) {
                Ok(messages) => Some(messages),
                Err(err) => {
                    warn!(thread_id = %thread_id, error = %err, "runtime: discarding unreadable checkpoint");
                    None
                }
            });

        let credential = credentials::resolve_openai_credential(self.secrets.as_ref(), tenant_id).await;
        let chat_model: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(credential.api_key));
        let summarizer = chat_model.clone();

        let mut deps = PipelineDeps::new(chat_model, summarizer)
            .with_tools(self.tools.clone())
            .with_tunables(self.tunables.clone());
        #[cfg(feature = "hooks")]
        {
            if let Some(hooks) = &self.hooks {
                deps = deps.with_hooks(hooks.clone());
            }
        }

        let graph = build_graph(Arc::new(deps)).map_err(RuntimeError::from)?;
        let resumed = checkpoint.is_some();
        let state = PipelineState::new(thread_id.clone(), tenant_id.clone(), user_messages)
            .with_history(turns)
            .with_checkpoint(checkpoint);

        info!(
            thread_id = %thread_id,
            history_len = state.history.len(),
            resumed_from_checkpoint = resumed,
            "runtime: pipeline run prepared"
        );
        Ok((graph, state))
    }

    /// Persists the assembled message window back to the checkpoint store
    /// (spec.md §4.3) so the next run against this thread can resume from it
    /// via `prepare`. Skipped when `messages` is empty — a guardrail-rejected
    /// run never reaches `memory_loader` and must not clobber a good
    /// checkpoint with an empty one.
    async fn save_checkpoint(&self, thread_id: &ThreadId, state: &PipelineState) {
        if state.messages.is_empty() {
            return;
        }

        let payload = match serde_json::to_value(&state.messages) {
            Ok(value) => value,
            Err(err) => {
                warn!(thread_id = %thread_id, error = %err, "runtime: failed to serialize checkpoint");
                return;
            }
        };

        if let Err(err) = self.checkpoints.save(thread_id, payload).await {
            warn!(thread_id = %thread_id, error = %err, "runtime: failed to persist checkpoint");
        }
    }

    /// One-shot invocation — returns the final merged state.
    pub async fn process(
        &self,
        thread_id: ThreadId,
        tenant_id: TenantId,
        user_messages: Vec<String>,
    ) -> Result<PipelineState> {
        let (graph, state) = self.prepare(&thread_id, &tenant_id, user_messages).await?;
        let final_state = graph.invoke(state).await.map_err(RuntimeError::from)?;
        self.save_checkpoint(&thread_id, &final_state).await;
        Ok(final_state)
    }

    /// Streaming invocation, mapped to the external event grammar:
    /// `reject` → `guardrail_reject` then the stream ends; `llm_agent`
    /// emitting non-empty `final_content` → `chunk`; once the run
    /// completes → `done` with metadata built from the accumulated state.
    pub fn stream(
        self: Arc<Self>,
        thread_id: ThreadId,
        tenant_id: TenantId,
        user_messages: Vec<String>,
    ) -> Pin<Box<dyn Stream<Item = Result<RuntimeEvent>> + Send>> {
        Box::pin(async_stream::stream! {
            let (graph, mut state) = match self.prepare(&thread_id, &tenant_id, user_messages).await {
                Ok(v) => v,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let graph = Arc::new(graph);
            let mut events = graph.stream(state.clone());

            while let Some(item) = events.next().await {
                match item {
                    Ok(graph_event) => {
                        state.merge(graph_event.partial.clone());

                        if graph_event.node == nodes::REJECT {
                            let reason = state
                                .guardrail_result
                                .as_ref()
                                .and_then(|g| g.rejection_reason.clone())
                                .unwrap_or_else(|| "the input could not be processed".to_string());
                            let metadata = cost_tracker::build_metadata(&state);
                            yield Ok(RuntimeEvent::GuardrailReject { reason, metadata });
                            return;
                        }

                        if graph_event.node == nodes::LLM_AGENT {
                            if let Some(content) = graph_event.partial.final_content.as_ref() {
                                if !content.is_empty() {
                                    yield Ok(RuntimeEvent::Chunk { content: content.clone() });
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(thread_id = %thread_id, error = %e, "runtime: graph stream failed");
                        yield Err(RuntimeError::from(e));
                        return;
                    }
                }
            }

            self.save_checkpoint(&thread_id, &state).await;

            let metadata = cost_tracker::build_metadata(&state);
            yield Ok(RuntimeEvent::Done { metadata });
        })
    }

    /// Runs the pipeline and persists one assistant message with the
    /// resulting content and metadata, per spec.md §4.4.
    pub async fn process_and_save(
        &self,
        thread_id: ThreadId,
        tenant_id: TenantId,
        system_agent_id: AgentId,
        user_messages: Vec<String>,
    ) -> Result<Message> {
        let final_state = self.process(thread_id.clone(), tenant_id, user_messages).await?;
        let metadata = cost_tracker::build_metadata(&final_state);
        let content = final_state.final_content.clone().unwrap_or_default();

        self.store
            .create_message(&thread_id, &system_agent_id, MessageRole::Assistant, &content, metadata)
            .await
            .map_err(RuntimeError::from)
    }
}

fn to_chat_turn(message: &Message) -> ChatMessage {
    let role = match message.role {
        MessageRole::User => ChatRole::User,
        MessageRole::Assistant => ChatRole::Assistant,
    };
    ChatMessage::new(role, message.content.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    use agentflow_core::{Agent, AgentNature, EntityTimestamps, Tenant};
    use agentflow_store::{InMemoryCheckpointStore, InMemorySecretsManager, InMemoryStore};
    use serde_json::json;

    async fn service() -> (AgentRuntimeService, TenantId, AgentId, ThreadId) {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = TenantId::new();
        store.seed_tenant(Tenant {
            id: tenant_id.clone(),
            name: "acme".into(),
            timestamps: EntityTimestamps::new(),
        });

        let system_agent = Agent {
            id: AgentId::new(),
            tenant_id: Some(tenant_id.clone()),
            first_name: "Assistant".into(),
            second_name: None,
            email: None,
            nature: AgentNature::System,
            origin: None,
            timestamps: EntityTimestamps::new(),
        };
        let agent_id = system_agent.id.clone();
        store.seed_agent(system_agent);

        let runtime_store: Arc<dyn Store> = store.clone();
        let thread = runtime_store
            .create_thread(tenant_id.clone(), Some("hi".into()), json!({}))
            .await
            .unwrap();

        let service = AgentRuntimeService::new(
            runtime_store,
            Arc::new(InMemoryCheckpointStore::new()),
            Arc::new(InMemorySecretsManager::new()),
        );

        (service, tenant_id, agent_id, thread.id)
    }

    #[tokio::test]
    async fn critical_pii_rejects_without_reaching_the_llm() {
        let (service, tenant_id, _agent_id, thread_id) = service().await;

        let result = service
            .process(thread_id, tenant_id, vec!["my ssn is 123-45-6789".to_string()])
            .await
            .unwrap();

        assert!(result.final_content.unwrap().starts_with("Message rejected:"));
        assert!(result.usage.is_none());
    }

    #[tokio::test]
    async fn stream_emits_guardrail_reject_then_ends() {
        let (service, tenant_id, _agent_id, thread_id) = service().await;
        let service = Arc::new(service);

        let events: Vec<_> = service
            .stream(thread_id, tenant_id, vec!["ssn 123-45-6789".to_string()])
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        match events.into_iter().next().unwrap().unwrap() {
            RuntimeEvent::GuardrailReject { reason, metadata } => {
                assert!(reason.contains("ssn"));
                assert_eq!(metadata["guardrail"]["status"], "rejected");
            }
            other => panic!("expected guardrail_reject, got {other:?}"),
        }
    }
}
