pub mod cost_tracker;
pub mod input_guard;
pub mod llm_agent;
pub mod memory_loader;
pub mod reject;
pub mod tools;

pub const INPUT_GUARD: &str = "input_guard";
pub const MEMORY_LOADER: &str = "memory_loader";
pub const LLM_AGENT: &str = "llm_agent";
pub const TOOLS: &str = "tools";
pub const COST_TRACKER: &str = "cost_tracker";
pub const REJECT: &str = "reject";
