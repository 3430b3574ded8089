use serde::{Deserialize, Serialize};

/// The SSE event grammar (spec.md §6): every event the dispatch loop
/// broadcasts and every subscriber observes is one of these four shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    Chunk { content: String },
    GuardrailReject { reason: String },
    Done { metadata: serde_json::Value },
    StreamEnd,
}

impl QueueEvent {
    pub fn is_stream_end(&self) -> bool {
        matches!(self, QueueEvent::StreamEnd)
    }
}
