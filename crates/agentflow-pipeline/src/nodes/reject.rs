use crate::state::{PipelineState, PipelineStatePartial};
use crate::GraphResult;

/// `reject` — terminal node for guardrail-rejected turns.
pub async fn run(state: PipelineState) -> GraphResult<PipelineStatePartial> {
    let reason = state
        .guardrail_result
        .as_ref()
        .and_then(|g| g.rejection_reason.clone())
        .filter(|r| !r.is_empty());

    let final_content = match reason {
        Some(reason) => format!("Message rejected: {reason}"),
        None => "Message rejected: the input could not be processed.".to_string(),
    };

    Ok(PipelineStatePartial {
        final_content: Some(final_content),
        ..Default::default()
    })
}
