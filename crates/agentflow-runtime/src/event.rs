use serde::{Deserialize, Serialize};

/// External events `AgentRuntimeService::stream` yields — the mapping
/// spec.md §4.4 describes from node outputs to the outer SSE grammar.
/// `stream_end` is not produced here: it is the dispatch loop's (C8)
/// responsibility once the whole coalesced run — possibly several of
/// these streams back to back — has finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    Chunk { content: String },
    /// `metadata` is carried internally for the dispatch loop to persist
    /// alongside the rejection message (spec.md §8 scenario 3 requires a
    /// `guardrail` metadata block even on a rejected run); it is not part
    /// of the wire-level SSE grammar in spec.md §6, which only forwards
    /// `reason` — see DESIGN.md.
    GuardrailReject {
        reason: String,
        metadata: serde_json::Value,
    },
    Done { metadata: serde_json::Value },
}
