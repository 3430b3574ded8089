//! Shared state and router assembly — spec.md §6's HTTP API, wired onto C6
//! (runtime) and C7 (queue manager) the way the teacher gateway wires its
//! `AppState` onto `AgentRuntime`/`MemoryManager`/etc.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use agentflow_core::config::AgentFlowConfig;
use agentflow_queue::QueueManager;
use agentflow_runtime::AgentRuntimeService;
use agentflow_store::Store;

pub struct AppState {
    pub config: AgentFlowConfig,
    pub store: Arc<dyn Store>,
    pub runtime: Arc<AgentRuntimeService>,
    pub queue: Arc<QueueManager>,
}

impl AppState {
    pub fn new(
        config: AgentFlowConfig,
        store: Arc<dyn Store>,
        runtime: Arc<AgentRuntimeService>,
        queue: Arc<QueueManager>,
    ) -> Self {
        Self {
            config,
            store,
            runtime,
            queue,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/threads/", post(crate::http::threads::create_thread))
        .route("/threads/{id}", delete(crate::http::threads::delete_thread))
        .route(
            "/threads/{id}/messages",
            post(crate::http::messages::send_message).get(crate::http::messages::list_messages),
        )
        .route("/threads/{id}/stream", get(crate::http::stream::stream_thread))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
