use serde::{Deserialize, Serialize};
use std::sync::Arc;

use agentflow_core::{ThreadId, TenantId};

/// Points in the pipeline that can be observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    /// Fired immediately before a request is sent to the chat model.
    /// Payload fields: model, system_prompt_len, message_count.
    LlmInput,
    /// Fired after a successful chat model response.
    /// Payload fields: model, tokens_in, tokens_out, latency_ms.
    LlmOutput,
    /// Fired when a chat model call fails.
    /// Payload fields: model, error.
    LlmError,
    /// Fired once per executed tool call.
    /// Payload fields: name, status.
    ToolCall,
    /// Fired when the guardrail rejects a message.
    /// Payload fields: reason, violations_count.
    GuardrailReject,
}

/// The context passed into every hook invocation. Payload is untyped JSON so
/// the engine stays decoupled from pipeline-specific structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    pub event: HookEvent,
    pub payload: serde_json::Value,
    pub thread_id: Option<ThreadId>,
    pub tenant_id: Option<TenantId>,
    /// Unix timestamp (ms) when the event was created, for latency accounting.
    pub timestamp: u64,
}

impl HookContext {
    pub fn new(event: HookEvent, payload: serde_json::Value) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            event,
            payload,
            thread_id: None,
            tenant_id: None,
            timestamp,
        }
    }

    pub fn with_thread(mut self, thread_id: ThreadId, tenant_id: TenantId) -> Self {
        self.thread_id = Some(thread_id);
        self.tenant_id = Some(tenant_id);
        self
    }
}

/// Synchronous hook handler trait. Handlers must be cheap — they run on a
/// spawned Tokio task, never on the caller's await point.
pub trait HookHandler: Send + Sync {
    fn handle(&self, ctx: &HookContext);
}

/// A registered hook binding a name, event filter, and handler.
pub struct HookDefinition {
    pub name: String,
    pub event: HookEvent,
    pub handler: Arc<dyn HookHandler>,
}

impl HookDefinition {
    pub fn new(name: impl Into<String>, event: HookEvent, handler: Arc<dyn HookHandler>) -> Self {
        Self {
            name: name.into(),
            event,
            handler,
        }
    }
}
