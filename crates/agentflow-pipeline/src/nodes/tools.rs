use std::sync::Arc;

use agentflow_store::{ChatMessage, ChatRole};
use tracing::warn;

use crate::deps::PipelineDeps;
use crate::state::{PipelineState, PipelineStatePartial, ToolCallLogEntry, ToolCallStatus};
use crate::{now_ms, GraphResult};

/// `tools` — execute every pending tool-call from the last assistant turn,
/// append one tool-result message per call, then loop back to `llm_agent`.
pub async fn run(deps: Arc<PipelineDeps>, state: PipelineState) -> GraphResult<PipelineStatePartial> {
    let pending = state
        .messages
        .last()
        .map(|m| m.tool_calls.clone())
        .unwrap_or_default();

    let mut messages = Vec::with_capacity(pending.len());
    let mut tool_calls_log = Vec::with_capacity(pending.len());

    for call in &pending {
        let (content, status) = match deps.find_tool(&call.name) {
            Some(tool) => match tool.call(call.arguments.clone()).await {
                Ok(result) => (result, ToolCallStatus::Success),
                Err(err) => {
                    warn!(tool = %call.name, error = %err, "tool execution failed");
                    (err, ToolCallStatus::Failed)
                }
            },
            None => {
                warn!(tool = %call.name, "tool not found in configured tool set");
                (format!("tool '{}' is not available", call.name), ToolCallStatus::Failed)
            }
        };

        let mut message = ChatMessage::new(ChatRole::Tool, content);
        message.tool_call_id = Some(call.id.clone());
        messages.push(message);

        tool_calls_log.push(ToolCallLogEntry {
            id: call.id.clone(),
            name: call.name.clone(),
            args: call.arguments.clone(),
            start_ms: now_ms(),
            status,
        });
    }

    Ok(PipelineStatePartial {
        messages,
        tool_calls_log,
        ..Default::default()
    })
}
