//! The agent processing pipeline (C2–C5): pricing table, pipeline state,
//! the five graph nodes, and the graph builder that wires them per
//! spec.md §4.3.

pub mod builder;
pub mod deps;
pub mod error;
pub mod memory;
pub mod nodes;
pub mod pricing;
pub mod state;

pub use builder::build_graph;
pub use deps::{PipelineDeps, PipelineTunables};
pub use error::{PipelineError, Result as GraphResult};
pub use state::{
    GuardrailResult, GuardrailSeverity, GuardrailStatus, GuardrailViolation, PipelineState,
    PipelineStatePartial, ToolCallLogEntry, ToolCallStatus, UsageInfo,
};

/// Milliseconds since the Unix epoch — used for tool-call log timestamps.
/// Wall-clock, not monotonic (monotonic timing is `Instant`-based via
/// `PipelineState::start_time`).
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
