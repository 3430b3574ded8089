use std::time::Instant;

use agentflow_guardrail::detect_pii;
use tracing::{debug, info};

use crate::state::{GuardrailResult, GuardrailStatus, GuardrailViolation, PipelineState, PipelineStatePartial};
use crate::GraphResult;

/// `input_guard` — join drained user messages, run the PII detector, and
/// decide whether this turn proceeds (clean/masked) or is rejected outright.
pub async fn run(state: PipelineState) -> GraphResult<PipelineStatePartial> {
    let combined_input = state.raw_user_messages.join("\n");
    let detection = detect_pii(&combined_input);

    let violations: Vec<GuardrailViolation> = detection
        .matches
        .iter()
        .map(|m| GuardrailViolation {
            category: m.category.to_string(),
            severity: m.severity.into(),
        })
        .collect();

    if detection.has_critical {
        let reason = detection
            .rejection_reason
            .clone()
            .unwrap_or_else(|| "Detected critical sensitive data".to_string());
        info!(thread_id = %state.thread_id, reason = %reason, "input_guard: rejecting message");

        return Ok(PipelineStatePartial {
            guardrail_result: Some(GuardrailResult {
                status: GuardrailStatus::Rejected,
                violations,
                rejection_reason: Some(reason),
                processed_content: None,
            }),
            processed_input: Some(String::new()),
            start_time: Some(Instant::now()),
            ..Default::default()
        });
    }

    let status = if detection.has_low {
        GuardrailStatus::Masked
    } else {
        GuardrailStatus::Clean
    };
    debug!(thread_id = %state.thread_id, ?status, violations = violations.len(), "input_guard: passed");

    Ok(PipelineStatePartial {
        guardrail_result: Some(GuardrailResult {
            status,
            violations,
            rejection_reason: None,
            processed_content: Some(detection.masked_text.clone()),
        }),
        processed_input: Some(detection.masked_text),
        start_time: Some(Instant::now()),
        ..Default::default()
    })
}

/// Conditional edge out of `input_guard`: rejected messages short-circuit to
/// `reject`, everything else proceeds to `memory_loader`.
pub fn route(state: &PipelineState) -> String {
    match &state.guardrail_result {
        Some(result) if result.status == GuardrailStatus::Rejected => crate::nodes::REJECT.to_string(),
        _ => crate::nodes::MEMORY_LOADER.to_string(),
    }
}
