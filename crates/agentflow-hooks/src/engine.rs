use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::types::{HookContext, HookDefinition};

/// Central registry and dispatcher for observability hooks.
///
/// Designed to be cheaply cloneable via `Arc` — one instance is shared
/// across the whole process.
pub struct HookEngine {
    hooks: RwLock<Vec<HookDefinition>>,
}

impl HookEngine {
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    pub fn register(&self, hook: HookDefinition) {
        let mut hooks = self.hooks.write().expect("hook registry poisoned");
        debug!(name = %hook.name, "hook registered");
        hooks.push(hook);
    }

    /// Spawn every handler registered for this event concurrently. Errors or
    /// panics inside a handler never propagate to the caller.
    pub fn emit_after(&self, ctx: HookContext) {
        let hooks = self.hooks.read().expect("hook registry poisoned");

        for hook in hooks.iter().filter(|h| h.event == ctx.event) {
            let handler = Arc::clone(&hook.handler);
            let ctx_clone = ctx.clone();
            let hook_name = hook.name.clone();

            tokio::spawn(async move {
                handler.handle(&ctx_clone);
                debug!(hook = %hook_name, "hook completed");
            });
        }
    }
}

impl Default for HookEngine {
    fn default() -> Self {
        Self::new()
    }
}
