use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, MessageId, TenantId, ThreadId};

/// Every domain entity carries these four timestamps. The richer of the two
/// variants the original source's merge-conflicted base model left behind —
/// see the Open Question in spec.md §9.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityTimestamps {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Default for EntityTimestamps {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of threads and agents. Minimal — no billing/plan/quota fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    #[serde(flatten)]
    pub timestamps: EntityTimestamps,
}

/// Which of the three natures an agent has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentNature {
    /// End-user identity.
    Human,
    /// LLM persona answering on behalf of the tenant.
    System,
    /// Task LLM (not directly addressed by end users).
    Worker,
}

/// External identity mapping for agents imported from a third-party chat
/// system (Telegram, Discord, …). Ingestion itself is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOrigin {
    pub origin_type: String,
    pub origin_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// `None` means platform-scoped (not owned by any single tenant).
    pub tenant_id: Option<TenantId>,
    pub first_name: String,
    pub second_name: Option<String>,
    pub email: Option<String>,
    pub nature: AgentNature,
    pub origin: Option<AgentOrigin>,
    #[serde(flatten)]
    pub timestamps: EntityTimestamps,
}

impl Agent {
    /// Platform agents (tenant_id = None) aren't mutable through tenant APIs.
    pub fn is_platform_scoped(&self) -> bool {
        self.tenant_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub tenant_id: TenantId,
    pub title: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Ordered set of participating agents — at-most-once membership per agent.
    pub agent_ids: Vec<AgentId>,
    #[serde(flatten)]
    pub timestamps: EntityTimestamps,
}

impl Thread {
    pub fn new(tenant_id: TenantId, title: String) -> Self {
        Self {
            id: ThreadId::new(),
            tenant_id,
            title,
            metadata: HashMap::new(),
            agent_ids: Vec::new(),
            timestamps: EntityTimestamps::new(),
        }
    }

    /// Add an agent to the thread's participant list, enforcing
    /// at-most-once membership.
    pub fn add_agent(&mut self, agent_id: AgentId) {
        if !self.agent_ids.contains(&agent_id) {
            self.agent_ids.push(agent_id);
            self.timestamps.updated_at = Utc::now();
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.timestamps.is_deleted()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub agent_id: AgentId,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(flatten)]
    pub timestamps: EntityTimestamps,
}

impl Message {
    pub fn new(
        thread_id: ThreadId,
        agent_id: AgentId,
        role: MessageRole,
        content: String,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: MessageId::new(),
            thread_id,
            agent_id,
            role,
            content,
            metadata,
            timestamps: EntityTimestamps::new(),
        }
    }
}

/// A single conversation turn as seen by the LLM — role + text, stripped of
/// storage-layer concerns. Distinct from `Message` (the persisted row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: MessageRole,
    pub content: String,
}
