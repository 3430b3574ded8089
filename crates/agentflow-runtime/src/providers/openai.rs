//! A concrete `ChatModel` backed by the OpenAI chat completions API,
//! grounded on the teacher's `OpenAiProvider` (request building, error
//! mapping for HTTP 429, JSON response shape). Simplified to the request
//! shapes `agentflow-store::chat` defines — role/content/tool_calls
//! instead of the teacher's raw Anthropic-block conversion path, since
//! this runtime has no multi-provider content-block abstraction to
//! reconcile.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use agentflow_store::{
    ChatMessage, ChatModel, ChatModelError, ChatRequest, ChatResponse, ChatRole, TokenUsage,
    ToolCall,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiChatModel {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn invoke(&self, request: ChatRequest) -> Result<ChatResponse, ChatModelError> {
        let body = build_request_body(&request);
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);

        debug!(model = %request.model, "sending request to OpenAI");

        let mut builder = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ChatModelError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status == 429 {
            return Err(ChatModelError::Api {
                status,
                message: "rate limited by upstream".to_string(),
            });
        }
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "OpenAI API error");
            return Err(ChatModelError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| ChatModelError::Parse(e.to_string()))?;

        Ok(parse_response(api_resp))
    }
}

fn build_request_body(req: &ChatRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = req.messages.iter().map(message_to_json).collect();

    let mut body = serde_json::json!({
        "model": req.model,
        "messages": messages,
        "stream": false,
    });

    if !req.tools.is_empty() {
        let tools: Vec<serde_json::Value> = req
            .tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        body["tools"] = serde_json::json!(tools);
    }

    body
}

fn message_to_json(msg: &ChatMessage) -> serde_json::Value {
    let role = match msg.role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::Tool => "tool",
    };

    if msg.role == ChatRole::Assistant && !msg.tool_calls.is_empty() {
        let tool_calls: Vec<serde_json::Value> = msg
            .tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        return serde_json::json!({
            "role": role,
            "content": if msg.content.is_empty() { serde_json::Value::Null } else { serde_json::json!(msg.content) },
            "tool_calls": tool_calls,
        });
    }

    if msg.role == ChatRole::Tool {
        return serde_json::json!({
            "role": role,
            "tool_call_id": msg.tool_call_id,
            "content": msg.content,
        });
    }

    serde_json::json!({
        "role": role,
        "content": msg.content,
    })
}

fn parse_response(resp: ApiResponse) -> ChatResponse {
    let choice = resp.choices.into_iter().next();
    let content = choice
        .as_ref()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    let tool_calls: Vec<ToolCall> = choice
        .as_ref()
        .and_then(|c| c.message.tool_calls.clone())
        .map(|calls| {
            calls
                .into_iter()
                .map(|tc| {
                    let arguments: serde_json::Value =
                        serde_json::from_str(&tc.function.arguments).unwrap_or_default();
                    ToolCall {
                        id: tc.id,
                        name: tc.function.name,
                        arguments,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let usage = resp
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.prompt_tokens + u.completion_tokens,
        })
        .unwrap_or_default();

    ChatResponse {
        content,
        tool_calls,
        usage,
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Deserialize, Clone)]
struct ApiToolCall {
    id: String,
    function: ApiFunction,
}

#[derive(Deserialize, Clone)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_store::ToolDefinition;

    #[test]
    fn build_request_body_includes_tools_when_present() {
        let req = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::new(ChatRole::User, "hi")],
            tools: vec![ToolDefinition {
                name: "lookup".to_string(),
                description: "look things up".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }],
        };
        let body = build_request_body(&req);
        assert_eq!(body["tools"][0]["function"]["name"], "lookup");
    }

    #[test]
    fn parse_response_extracts_content_and_usage() {
        let resp = ApiResponse {
            choices: vec![ApiChoice {
                message: ApiMessage {
                    content: Some("hello".to_string()),
                    tool_calls: None,
                },
            }],
            usage: Some(ApiUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            }),
        };
        let parsed = parse_response(resp);
        assert_eq!(parsed.content, "hello");
        assert_eq!(parsed.usage.total_tokens, 15);
    }
}
