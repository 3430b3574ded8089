use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentFlowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Thread not found: {id}")]
    ThreadNotFound { id: String },

    #[error("Agent not found: {id}")]
    AgentNotFound { id: String },

    #[error("Tenant has no system agent: {tenant_id}")]
    NoSystemAgent { tenant_id: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentFlowError {
    /// Short error code string surfaced to HTTP clients.
    pub fn code(&self) -> &'static str {
        match self {
            AgentFlowError::Config(_) => "CONFIG_ERROR",
            AgentFlowError::Validation(_) => "VALIDATION_ERROR",
            AgentFlowError::ThreadNotFound { .. } => "THREAD_NOT_FOUND",
            AgentFlowError::AgentNotFound { .. } => "AGENT_NOT_FOUND",
            AgentFlowError::NoSystemAgent { .. } => "NO_SYSTEM_AGENT",
            AgentFlowError::Store(_) => "STORE_ERROR",
            AgentFlowError::LlmProvider(_) => "LLM_PROVIDER_ERROR",
            AgentFlowError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentFlowError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code this error maps to.
    pub fn status(&self) -> u16 {
        match self {
            AgentFlowError::ThreadNotFound { .. } | AgentFlowError::AgentNotFound { .. } => 404,
            AgentFlowError::Validation(_) | AgentFlowError::NoSystemAgent { .. } => 400,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentFlowError>;
