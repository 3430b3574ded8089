use std::sync::Arc;
use std::time::Instant;

use agentflow_store::{ChatMessage, ChatRequest, ChatRole, ToolDefinition};
use tracing::info;

use crate::deps::PipelineDeps;
use crate::state::{PipelineState, PipelineStatePartial, ToolCallLogEntry, ToolCallStatus, UsageInfo};
use crate::{now_ms, GraphResult};

#[cfg(feature = "hooks")]
use agentflow_hooks::{HookContext, HookEvent};

/// `llm_agent` — invoke the bound chat model on the current `messages`.
/// Logs pending tool-calls if the response requested any; otherwise sets
/// `final_content`. Emits token usage either way.
pub async fn run(deps: Arc<PipelineDeps>, state: PipelineState) -> GraphResult<PipelineStatePartial> {
    let model = deps.chat_model.as_ref();
    let tool_defs: Vec<ToolDefinition> = deps.tools.iter().map(|t| t.definition()).collect();

    let request = ChatRequest {
        model: deps.tunables.chat_model_name.clone(),
        messages: state.messages.clone(),
        tools: tool_defs,
    };

    #[cfg(feature = "hooks")]
    hook_llm_input(&deps, &request);

    let started = Instant::now();
    let response = match model.invoke(request.clone()).await {
        Ok(r) => r,
        Err(err) => {
            #[cfg(feature = "hooks")]
            hook_llm_error(&deps, &request.model, &err);
            return Err(crate::PipelineError::ChatModel(err));
        }
    };
    let latency_ms = started.elapsed().as_millis() as u64;

    #[cfg(feature = "hooks")]
    hook_llm_output(&deps, &request.model, &response, latency_ms);

    info!(
        thread_id = %state.thread_id,
        model = %request.model,
        tool_calls = response.tool_calls.len(),
        "llm_agent: response received"
    );

    let mut assistant_turn = ChatMessage::new(ChatRole::Assistant, response.content.clone());
    assistant_turn.tool_calls = response.tool_calls.clone();

    let mut tool_calls_log = Vec::new();
    let mut final_content = None;

    if response.tool_calls.is_empty() {
        final_content = Some(response.content.clone());
    } else {
        let start_ms = now_ms();
        for call in &response.tool_calls {
            tool_calls_log.push(ToolCallLogEntry {
                id: call.id.clone(),
                name: call.name.clone(),
                args: call.arguments.clone(),
                start_ms,
                status: ToolCallStatus::Pending,
            });
        }
    }

    let usage = UsageInfo::from_token_usage(&request.model, &response.usage);

    Ok(PipelineStatePartial {
        messages: vec![assistant_turn],
        tool_calls_log,
        usage: Some(usage),
        final_content,
        ..Default::default()
    })
}

/// Conditional edge out of `llm_agent`: if the last message carries pending
/// tool-calls and tools are configured, loop into `tools`; otherwise finish
/// at `cost_tracker`.
pub fn route(has_tools: bool) -> impl Fn(&PipelineState) -> String {
    move |state: &PipelineState| {
        let last_has_pending_calls = state
            .messages
            .last()
            .map(|m| !m.tool_calls.is_empty())
            .unwrap_or(false);

        if has_tools && last_has_pending_calls {
            crate::nodes::TOOLS.to_string()
        } else {
            crate::nodes::COST_TRACKER.to_string()
        }
    }
}

#[cfg(feature = "hooks")]
fn hook_llm_input(deps: &PipelineDeps, request: &ChatRequest) {
    let Some(engine) = deps.hooks.clone() else {
        return;
    };
    let payload = serde_json::json!({
        "model": request.model,
        "system_prompt_len": request.messages.first().map(|m| m.content.len()).unwrap_or(0),
        "message_count": request.messages.len(),
    });
    let ctx = HookContext::new(HookEvent::LlmInput, payload);
    tokio::spawn(async move { engine.emit_after(ctx) });
}

#[cfg(feature = "hooks")]
fn hook_llm_output(deps: &PipelineDeps, model: &str, response: &agentflow_store::ChatResponse, latency_ms: u64) {
    let Some(engine) = deps.hooks.clone() else {
        return;
    };
    let payload = serde_json::json!({
        "model": model,
        "tokens_in": response.usage.input_tokens,
        "tokens_out": response.usage.output_tokens,
        "latency_ms": latency_ms,
    });
    let ctx = HookContext::new(HookEvent::LlmOutput, payload);
    tokio::spawn(async move { engine.emit_after(ctx) });
}

#[cfg(feature = "hooks")]
fn hook_llm_error(deps: &PipelineDeps, model: &str, err: &agentflow_store::ChatModelError) {
    let Some(engine) = deps.hooks.clone() else {
        return;
    };
    let payload = serde_json::json!({ "model": model, "error": err.to_string() });
    let ctx = HookContext::new(HookEvent::LlmError, payload);
    tokio::spawn(async move { engine.emit_after(ctx) });
}
