//! POST/GET /threads/{id}/messages — spec.md §6.
//!
//! `send_message` persists the user message, enqueues it (C7), and spawns
//! the dispatch loop (C8) iff this call observed the transition into
//! `processing` — never when another run is already in flight (P1).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use agentflow_core::{AgentId, MessageRole, ThreadId};
use agentflow_queue::{EnqueueOutcome, QueuedMessage};

use crate::app::AppState;
use crate::auth::check_auth;
use crate::dispatch;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub agent_id: AgentId,
}

#[derive(Serialize)]
pub struct SendMessageResponse {
    pub message_id: agentflow_core::MessageId,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct MessageRead {
    pub id: agentflow_core::MessageId,
    pub thread_id: ThreadId,
    pub agent_id: AgentId,
    pub role: MessageRole,
    pub content: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl From<agentflow_core::Message> for MessageRead {
    fn from(message: agentflow_core::Message) -> Self {
        Self {
            id: message.id,
            thread_id: message.thread_id,
            agent_id: message.agent_id,
            role: message.role,
            content: message.content,
            metadata: message.metadata,
            created_at: message.timestamps.created_at,
        }
    }
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(thread_id): Path<ThreadId>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ApiError> {
    if !check_auth(&state, &headers) {
        return Err(ApiError::unauthorized());
    }

    state.store.ensure_agent_in_thread(&thread_id, &req.agent_id).await?;

    let message = state
        .store
        .create_message(&thread_id, &req.agent_id, MessageRole::User, &req.content, json!({}))
        .await?;

    let outcome = state
        .queue
        .enqueue(
            &thread_id,
            QueuedMessage {
                message_id: message.id.clone(),
                content: req.content,
            },
        )
        .await;

    if outcome == EnqueueOutcome::Processing {
        let thread = state.store.get_thread(&thread_id).await?;
        let system_agent = state.store.get_system_agent_for_tenant(&thread.tenant_id).await?;
        dispatch::spawn(state.clone(), thread_id, thread.tenant_id, system_agent.id);
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(SendMessageResponse {
            message_id: message.id,
            status: outcome.as_status_str(),
        }),
    ))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(thread_id): Path<ThreadId>,
) -> Result<Json<Vec<MessageRead>>, ApiError> {
    if !check_auth(&state, &headers) {
        return Err(ApiError::unauthorized());
    }

    let history = state.store.get_history(&thread_id).await?;
    Ok(Json(history.into_iter().map(MessageRead::from).collect()))
}
