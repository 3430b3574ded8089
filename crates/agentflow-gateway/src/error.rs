//! Maps collaborator errors onto the HTTP status codes spec.md §6 names:
//! 404 for an unknown thread/agent, 400 for an unauthorized author agent or
//! a tenant with no system agent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use agentflow_runtime::RuntimeError;
use agentflow_store::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Unauthorized. Set 'Authorization: Bearer <your-token>' header.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": { "code": self.code, "message": self.message } }));
        (self.status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::ThreadNotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, "THREAD_NOT_FOUND", err.to_string())
            }
            StoreError::AgentNotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, "AGENT_NOT_FOUND", err.to_string())
            }
            StoreError::AgentNotAuthorized { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "AGENT_NOT_AUTHORIZED", err.to_string())
            }
            StoreError::NoSystemAgent(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "NO_SYSTEM_AGENT", err.to_string())
            }
            StoreError::SecretNotFound { .. } => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "SECRET_NOT_FOUND", err.to_string())
            }
        }
    }
}

impl From<RuntimeError> for ApiError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::Store(e) => e.into(),
            RuntimeError::Graph(e) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "GRAPH_ERROR", e.to_string())
            }
        }
    }
}
