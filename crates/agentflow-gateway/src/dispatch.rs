//! Dispatch Loop (C8) — spec.md §4.6.
//!
//! Spawned as a detached task immediately after an `enqueue` that returned
//! `"processing"`. Drains the thread's queue, runs the pipeline via the
//! runtime service, forwards every event to the queue manager's broadcast
//! list, persists one assistant message per run, and loops again if new
//! messages arrived while it was running.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{error, info};

use agentflow_core::{AgentId, MessageRole, TenantId, ThreadId};
use agentflow_queue::QueueEvent;
use agentflow_runtime::RuntimeEvent;

use crate::app::AppState;

/// Starts the dispatch loop as a detached background task. The caller is
/// responsible for only doing this when `QueueManager::enqueue` returned
/// `Processing` — spawning a second loop for the same thread would violate
/// P1 (single active run).
pub fn spawn(state: Arc<AppState>, thread_id: ThreadId, tenant_id: TenantId, system_agent_id: AgentId) {
    tokio::spawn(async move {
        run(state, thread_id, tenant_id, system_agent_id).await;
    });
}

async fn run(state: Arc<AppState>, thread_id: ThreadId, tenant_id: TenantId, system_agent_id: AgentId) {
    loop {
        let drained = state.queue.drain_and_merge(&thread_id).await;
        if drained.is_empty() {
            break;
        }
        let contents: Vec<String> = drained.into_iter().map(|m| m.content).collect();
        info!(thread_id = %thread_id, batch_size = contents.len(), "dispatch loop: starting pipeline run");

        let mut collected = String::new();
        let mut metadata: Option<serde_json::Value> = None;

        let mut events = state
            .runtime
            .clone()
            .stream(thread_id.clone(), tenant_id.clone(), contents);

        while let Some(event) = events.next().await {
            match event {
                Ok(RuntimeEvent::Chunk { content }) => {
                    collected.push_str(&content);
                    state.queue.broadcast(&thread_id, QueueEvent::Chunk { content });
                }
                Ok(RuntimeEvent::GuardrailReject { reason, metadata: rejected_metadata }) => {
                    // The SSE wire grammar (spec.md §6) only carries `reason`; the
                    // fuller metadata block is kept for persistence below, per
                    // DESIGN.md's note on RuntimeEvent::GuardrailReject.
                    collected = format!("Message rejected: {reason}");
                    metadata = Some(rejected_metadata);
                    state.queue.broadcast(&thread_id, QueueEvent::GuardrailReject { reason });
                }
                Ok(RuntimeEvent::Done { metadata: done_metadata }) => {
                    metadata = Some(done_metadata.clone());
                    state.queue.broadcast(&thread_id, QueueEvent::Done { metadata: done_metadata });
                }
                Err(err) => {
                    error!(thread_id = %thread_id, error = %err, "dispatch loop: pipeline run failed");
                    break;
                }
            }
        }

        if let Err(err) = state.store.ensure_agent_in_thread(&thread_id, &system_agent_id).await {
            error!(thread_id = %thread_id, error = %err, "dispatch loop: failed to register system agent");
        }

        let content = if collected.is_empty() { "(no response)".to_string() } else { collected };
        let metadata_value = metadata.unwrap_or(serde_json::Value::Null);
        if let Err(err) = state
            .store
            .create_message(&thread_id, &system_agent_id, MessageRole::Assistant, &content, metadata_value)
            .await
        {
            error!(thread_id = %thread_id, error = %err, "dispatch loop: failed to persist assistant message");
        }

        if !state.queue.mark_done(&thread_id).await {
            break;
        }
        info!(thread_id = %thread_id, "dispatch loop: new messages arrived during run, looping again");
    }

    state.queue.broadcast(&thread_id, QueueEvent::StreamEnd);
}
