use std::sync::Arc;

use agentflow_store::ChatRole;
use tracing::debug;

use crate::deps::PipelineDeps;
use crate::memory::{assemble_messages, summarize_dropped, trim_to_budget};
use crate::state::{PipelineState, PipelineStatePartial};
use crate::GraphResult;

/// `memory_loader` — builds the fresh message list handed to the LLM: the
/// platform system prompt, the trimmed prior history (summarized if
/// anything was dropped), and the processed input as the new user turn.
///
/// When `state.checkpoint` carries the prior run's assembled window
/// (spec.md §4.3), that window is resumed from directly instead of
/// re-trimming and re-summarizing `history` from scratch: its own system
/// turns (platform prompt, earlier summary) are dropped and the remaining
/// conversation is re-trimmed to budget alongside the fresh input.
pub async fn run(deps: Arc<PipelineDeps>, state: PipelineState) -> GraphResult<PipelineStatePartial> {
    let budget = deps.tunables.context_budget_tokens;

    let (tail, dropped) = match &state.checkpoint {
        Some(checkpoint) => {
            let conversation: Vec<_> = checkpoint
                .iter()
                .filter(|turn| turn.role != ChatRole::System)
                .cloned()
                .collect();
            trim_to_budget(&conversation, budget)
        }
        None => trim_to_budget(&state.history, budget),
    };

    let summary = summarize_dropped(deps.summarizer.as_ref(), &deps.tunables.summary_model, &dropped).await;
    if !dropped.is_empty() {
        debug!(
            thread_id = %state.thread_id,
            dropped = dropped.len(),
            summarized = summary.is_some(),
            "memory_loader: trimmed history"
        );
    }

    let messages = assemble_messages(tail, summary, &state.processed_input);

    Ok(PipelineStatePartial {
        messages,
        ..Default::default()
    })
}
