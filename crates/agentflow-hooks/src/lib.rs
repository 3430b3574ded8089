pub mod engine;
pub mod types;

pub use engine::HookEngine;
pub use types::{HookContext, HookDefinition, HookEvent, HookHandler};
