use std::collections::HashMap;

use serde_json::json;

use crate::pricing::cost_usd;
use crate::state::{GuardrailStatus, PipelineState, PipelineStatePartial, ToolCallStatus};
use crate::GraphResult;

/// `cost_tracker` — terminal for the success path. Finalizes `usage` with
/// `cost_usd` and computes `response_time_ms` from `start_time`.
pub async fn run(state: PipelineState) -> GraphResult<PipelineStatePartial> {
    let response_time_ms = state
        .start_time
        .map(|t0| t0.elapsed().as_secs_f64() * 1000.0)
        .map(|ms| ms.round() as u64)
        .unwrap_or(0);

    let usage = state.usage.clone().map(|mut usage| {
        usage.cost_usd = cost_usd(&usage.model, usage.input_tokens, usage.output_tokens);
        usage
    });

    Ok(PipelineStatePartial {
        usage,
        response_time_ms: Some(response_time_ms),
        ..Default::default()
    })
}

/// Builds the metadata block persisted alongside the assistant message,
/// per spec.md §4.2/§6.
pub fn build_metadata(state: &PipelineState) -> serde_json::Value {
    // Later log entries for the same tool-call id supersede earlier ones
    // (an `llm_agent`-logged `pending` entry, then a `tools`-logged final
    // status) — keep only the last entry seen per id, in first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, (&str, ToolCallStatus)> = HashMap::new();
    for entry in &state.tool_calls_log {
        if !by_id.contains_key(&entry.id) {
            order.push(entry.id.clone());
        }
        by_id.insert(entry.id.clone(), (entry.name.as_str(), entry.status));
    }

    let tool_calls: Vec<serde_json::Value> = order
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|(name, status)| {
            json!({
                "name": name,
                "status": status_str(*status),
            })
        })
        .collect();

    let guardrail = state.guardrail_result.as_ref().map(|g| {
        json!({
            "status": guardrail_status_str(g.status),
            "violations_count": g.violations.len(),
        })
    });

    let usage = state.usage.clone().unwrap_or_default();

    json!({
        "model": usage.model,
        "tokens": {
            "input": usage.input_tokens,
            "output": usage.output_tokens,
            "total": usage.total_tokens,
        },
        "cost_usd": usage.cost_usd,
        "response_time_ms": state.response_time_ms.unwrap_or(0),
        "tool_calls": tool_calls,
        "guardrail": guardrail,
    })
}

fn status_str(status: ToolCallStatus) -> &'static str {
    match status {
        ToolCallStatus::Pending => "pending",
        ToolCallStatus::Success => "success",
        ToolCallStatus::Failed => "failed",
    }
}

fn guardrail_status_str(status: GuardrailStatus) -> &'static str {
    match status {
        GuardrailStatus::Clean => "clean",
        GuardrailStatus::Masked => "masked",
        GuardrailStatus::Rejected => "rejected",
    }
}
