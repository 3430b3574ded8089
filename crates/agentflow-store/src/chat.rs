use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Present on assistant messages that requested tool execution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Present on tool-role messages, correlating back to the call that
    /// produced this result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Async, external collaborator invoked to execute a single tool call. Real
/// tools (search, calculators, integrations) live outside this crate; what
/// the pipeline needs is just this interface.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn call(&self, arguments: Value) -> Result<String, String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone)]
pub enum ChatStreamEvent {
    Delta(String),
    Done { usage: TokenUsage, tool_calls: Vec<ToolCall> },
}

#[derive(Debug, thiserror::Error)]
pub enum ChatModelError {
    #[error("http error: {0}")]
    Http(String),

    #[error("upstream api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response parse error: {0}")]
    Parse(String),
}

/// The chat model boundary the pipeline's `llm_agent` node invokes. Nothing
/// in this crate knows which provider (OpenAI, Anthropic, a local model)
/// sits behind it.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, request: ChatRequest) -> Result<ChatResponse, ChatModelError>;

    async fn stream(
        &self,
        request: ChatRequest,
        tx: mpsc::Sender<ChatStreamEvent>,
    ) -> Result<(), ChatModelError> {
        let response = self.invoke(request).await?;
        let _ = tx.send(ChatStreamEvent::Delta(response.content)).await;
        let _ = tx
            .send(ChatStreamEvent::Done {
                usage: response.usage,
                tool_calls: response.tool_calls,
            })
            .await;
        Ok(())
    }
}
