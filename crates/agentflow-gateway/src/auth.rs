//! Bearer-token auth check, gated by `AgentFlowConfig::gateway.auth`.

use axum::http::HeaderMap;

use agentflow_core::config::AuthMode;

use crate::app::AppState;

pub fn check_auth(state: &AppState, headers: &HeaderMap) -> bool {
    match state.config.gateway.auth.mode {
        AuthMode::None => true,
        AuthMode::Token => {
            let Some(expected) = &state.config.gateway.auth.token else {
                return false;
            };
            extract_bearer(headers).map(|t| t == expected).unwrap_or(false)
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}
