pub mod config;
pub mod error;
pub mod ids;
pub mod types;

pub use error::{AgentFlowError, Result};
pub use ids::{AgentId, MessageId, TenantId, ThreadId};
pub use types::{
    Agent, AgentNature, AgentOrigin, ConversationTurn, EntityTimestamps, Message, MessageRole,
    Tenant, Thread,
};
