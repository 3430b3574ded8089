//! Integration tests exercising the compiled graph end to end — covers
//! spec.md §8's P5/P6 and concrete scenarios 3/4.

use std::sync::Arc;

use agentflow_core::{TenantId, ThreadId};
use agentflow_pipeline::{build_graph, PipelineDeps, PipelineState};
use agentflow_store::{ChatModel, ChatModelError, ChatRequest, ChatResponse, TokenUsage};
use async_trait::async_trait;

struct StubChatModel {
    reply: String,
}

#[async_trait]
impl ChatModel for StubChatModel {
    async fn invoke(&self, _request: ChatRequest) -> Result<ChatResponse, ChatModelError> {
        Ok(ChatResponse {
            content: self.reply.clone(),
            tool_calls: Vec::new(),
            usage: TokenUsage {
                input_tokens: 12,
                output_tokens: 8,
                total_tokens: 20,
            },
        })
    }
}

fn deps_with_reply(reply: &str) -> Arc<PipelineDeps> {
    Arc::new(PipelineDeps::new(
        Arc::new(StubChatModel {
            reply: reply.to_string(),
        }),
        Arc::new(StubChatModel {
            reply: "summary".to_string(),
        }),
    ))
}

#[tokio::test]
async fn clean_message_runs_the_full_happy_path() {
    let deps = deps_with_reply("Hello there!");
    let graph = build_graph(deps).unwrap();

    let state = PipelineState::new(ThreadId::new(), TenantId::new(), vec!["Hello".to_string()]);
    let result = graph.invoke(state).await.unwrap();

    assert_eq!(result.final_content.as_deref(), Some("Hello there!"));
    let usage = result.usage.expect("usage should be set by cost_tracker");
    assert_eq!(usage.input_tokens, 12);
    assert_eq!(usage.output_tokens, 8);
    assert!(usage.cost_usd >= 0.0);
    assert!(result.response_time_ms.is_some());
}

#[tokio::test]
async fn critical_pii_short_circuits_before_llm_agent() {
    let deps = deps_with_reply("should never be produced");
    let graph = build_graph(deps).unwrap();

    let state = PipelineState::new(
        ThreadId::new(),
        TenantId::new(),
        vec!["My SSN is 123-45-6789".to_string()],
    );
    let result = graph.invoke(state).await.unwrap();

    assert!(result
        .final_content
        .as_deref()
        .unwrap()
        .starts_with("Message rejected:"));
    // P6: no tokens-usage persisted on a rejected run.
    assert!(result.usage.is_none());
    assert!(result.messages.is_empty());
}

#[tokio::test]
async fn low_severity_pii_is_masked_and_run_completes_normally() {
    let deps = deps_with_reply("Sure, I've noted that.");
    let graph = build_graph(deps).unwrap();

    let state = PipelineState::new(
        ThreadId::new(),
        TenantId::new(),
        vec!["Email me at a@b.co".to_string()],
    );
    let result = graph.invoke(state).await.unwrap();

    assert_eq!(result.final_content.as_deref(), Some("Sure, I've noted that."));
    let guardrail = result.guardrail_result.unwrap();
    assert_eq!(guardrail.violations.len(), 1);
    assert!(guardrail.rejection_reason.is_none());
}
