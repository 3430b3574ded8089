//! Pipeline state (C3) — the typed record that flows through the graph.
//!
//! Nodes never touch `PipelineState` directly: they return a
//! [`PipelineStatePartial`] and the executor merges it in via
//! [`agentflow_graph::GraphState::merge`]. `messages` and `tool_calls_log`
//! are append-merged; every other field is last-write-wins, per spec.md §9.

use std::time::Instant;

use agentflow_core::{TenantId, ThreadId};
use agentflow_guardrail::Severity;
use agentflow_store::{ChatMessage, TokenUsage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailStatus {
    Clean,
    Masked,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailViolation {
    pub category: String,
    pub severity: GuardrailSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailSeverity {
    Low,
    Critical,
}

impl From<Severity> for GuardrailSeverity {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Low => GuardrailSeverity::Low,
            Severity::Critical => GuardrailSeverity::Critical,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailResult {
    pub status: GuardrailStatus,
    pub violations: Vec<GuardrailViolation>,
    pub rejection_reason: Option<String>,
    pub processed_content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallLogEntry {
    /// Matches the originating `ToolCall::id`. Later entries with the same
    /// id (e.g. a `success`/`failed` update after the initial `pending`
    /// entry) supersede earlier ones when metadata is built.
    pub id: String,
    pub name: String,
    pub args: serde_json::Value,
    pub start_ms: u64,
    pub status: ToolCallStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageInfo {
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    pub cost_usd: f64,
}

impl UsageInfo {
    pub fn from_token_usage(model: &str, usage: &TokenUsage) -> Self {
        Self {
            model: model.to_string(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens,
            cost_usd: 0.0,
        }
    }
}

/// Transient state for one pipeline invocation (spec.md §3).
#[derive(Clone)]
pub struct PipelineState {
    pub thread_id: ThreadId,
    pub tenant_id: TenantId,
    pub raw_user_messages: Vec<String>,
    pub processed_input: String,
    pub guardrail_result: Option<GuardrailResult>,
    /// Prior conversation turns loaded from the store before this run
    /// started. Read-only input to `memory_loader`; not part of the
    /// append-merged `messages` field below.
    pub history: Vec<ChatMessage>,
    /// The assembled LLM window checkpointed at the end of the thread's
    /// most recent run, keyed by `thread_id` (spec.md §4.3). When present,
    /// `memory_loader` resumes from it directly instead of re-trimming and
    /// re-summarizing `history` from scratch.
    pub checkpoint: Option<Vec<ChatMessage>>,
    /// Built fresh by `memory_loader`, then appended to by `llm_agent` and
    /// `tools`. Empty at the start of every run.
    pub messages: Vec<ChatMessage>,
    /// Append-merged across node outputs.
    pub tool_calls_log: Vec<ToolCallLogEntry>,
    pub usage: Option<UsageInfo>,
    pub response_time_ms: Option<u64>,
    pub final_content: Option<String>,
    pub start_time: Option<Instant>,
}

impl PipelineState {
    pub fn new(thread_id: ThreadId, tenant_id: TenantId, raw_user_messages: Vec<String>) -> Self {
        Self {
            thread_id,
            tenant_id,
            raw_user_messages,
            processed_input: String::new(),
            guardrail_result: None,
            history: Vec::new(),
            checkpoint: None,
            messages: Vec::new(),
            tool_calls_log: Vec::new(),
            usage: None,
            response_time_ms: None,
            final_content: None,
            start_time: None,
        }
    }

    /// Seed the conversation with prior history loaded from the store,
    /// converted to chat turns. Read by `memory_loader`; the graph's own
    /// `messages` field starts empty regardless.
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Seed the prior run's checkpointed message window, if one was loaded
    /// from the checkpoint store. `memory_loader` resumes from this instead
    /// of re-trimming and re-summarizing `history` when present.
    pub fn with_checkpoint(mut self, checkpoint: Option<Vec<ChatMessage>>) -> Self {
        self.checkpoint = checkpoint;
        self
    }
}

/// Partial update produced by a single node. `None` means "this node did
/// not touch this field" — it is not a replace-with-default.
#[derive(Clone, Default)]
pub struct PipelineStatePartial {
    pub raw_user_messages: Option<Vec<String>>,
    pub processed_input: Option<String>,
    pub guardrail_result: Option<GuardrailResult>,
    /// Entries to append to `messages`, not the full list.
    pub messages: Vec<ChatMessage>,
    /// Entries to append to `tool_calls_log`, not the full list.
    pub tool_calls_log: Vec<ToolCallLogEntry>,
    pub usage: Option<UsageInfo>,
    pub response_time_ms: Option<u64>,
    pub final_content: Option<String>,
    pub start_time: Option<Instant>,
}

impl agentflow_graph::GraphState for PipelineState {
    type Partial = PipelineStatePartial;

    fn merge(&mut self, partial: Self::Partial) {
        if let Some(v) = partial.raw_user_messages {
            self.raw_user_messages = v;
        }
        if let Some(v) = partial.processed_input {
            self.processed_input = v;
        }
        if let Some(v) = partial.guardrail_result {
            self.guardrail_result = Some(v);
        }
        self.messages.extend(partial.messages);
        self.tool_calls_log.extend(partial.tool_calls_log);
        if let Some(v) = partial.usage {
            self.usage = Some(v);
        }
        if let Some(v) = partial.response_time_ms {
            self.response_time_ms = Some(v);
        }
        if let Some(v) = partial.final_content {
            self.final_content = Some(v);
        }
        if let Some(v) = partial.start_time {
            self.start_time = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_graph::GraphState;
    use agentflow_store::ChatRole;

    #[test]
    fn messages_field_appends_rather_than_replaces() {
        let mut state = PipelineState::new(ThreadId::new(), TenantId::new(), vec!["hi".into()]);
        state.merge(PipelineStatePartial {
            messages: vec![ChatMessage::new(ChatRole::User, "hi")],
            ..Default::default()
        });
        state.merge(PipelineStatePartial {
            messages: vec![ChatMessage::new(ChatRole::Assistant, "hello")],
            ..Default::default()
        });
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "hi");
        assert_eq!(state.messages[1].content, "hello");
    }

    #[test]
    fn scalar_fields_are_last_write_wins() {
        let mut state = PipelineState::new(ThreadId::new(), TenantId::new(), vec![]);
        state.merge(PipelineStatePartial {
            final_content: Some("first".into()),
            ..Default::default()
        });
        state.merge(PipelineStatePartial {
            final_content: Some("second".into()),
            ..Default::default()
        });
        assert_eq!(state.final_content.as_deref(), Some("second"));
    }
}
