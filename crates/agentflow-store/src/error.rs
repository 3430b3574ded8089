use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("thread not found: {0}")]
    ThreadNotFound(String),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("agent {agent_id} is neither platform-scoped nor tenant-matching for {tenant_id}")]
    AgentNotAuthorized { agent_id: String, tenant_id: String },

    #[error("tenant {0} has no system agent")]
    NoSystemAgent(String),

    #[error("secret not found for tenant {tenant_id}, integration {integration}")]
    SecretNotFound { tenant_id: String, integration: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
