//! POST /threads/, DELETE /threads/{id} — spec.md §6.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use agentflow_core::{ThreadId, TenantId};

use crate::app::AppState;
use crate::auth::check_auth;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateThreadRequest {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Serialize)]
pub struct ThreadRead {
    pub id: ThreadId,
    pub tenant_id: TenantId,
    pub title: String,
    pub metadata: HashMap<String, Value>,
    pub agent_ids: Vec<agentflow_core::AgentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<agentflow_core::Thread> for ThreadRead {
    fn from(thread: agentflow_core::Thread) -> Self {
        Self {
            id: thread.id,
            tenant_id: thread.tenant_id,
            title: thread.title,
            metadata: thread.metadata,
            agent_ids: thread.agent_ids,
            created_at: thread.timestamps.created_at,
            updated_at: thread.timestamps.updated_at,
            deleted_at: thread.timestamps.deleted_at,
        }
    }
}

pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateThreadRequest>,
) -> Result<(StatusCode, Json<ThreadRead>), ApiError> {
    if !check_auth(&state, &headers) {
        return Err(ApiError::unauthorized());
    }

    let metadata = req.metadata.unwrap_or_else(|| Value::Object(Default::default()));
    let thread = state.store.create_thread(req.tenant_id, req.title, metadata).await?;
    Ok((StatusCode::CREATED, Json(thread.into())))
}

pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(thread_id): Path<ThreadId>,
) -> Result<StatusCode, ApiError> {
    if !check_auth(&state, &headers) {
        return Err(ApiError::unauthorized());
    }

    state.store.delete_thread(&thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
