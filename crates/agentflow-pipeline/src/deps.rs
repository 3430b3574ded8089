//! External collaborators the graph nodes close over. Built once per
//! pipeline run by `agentflow-runtime` and shared into every node closure
//! via `Arc`.

use std::sync::Arc;

use agentflow_store::{ChatModel, Tool};

#[cfg(feature = "hooks")]
use agentflow_hooks::HookEngine;

/// Tunables `memory_loader` needs that spec.md leaves as implementation
/// constants but which a real deployment configures (see SPEC_FULL.md §6).
#[derive(Debug, Clone)]
pub struct PipelineTunables {
    pub context_budget_tokens: usize,
    pub summary_model: String,
    /// Identifier passed in `ChatRequest::model` and recorded into
    /// `usage.model`. The chat model trait object itself is opaque about
    /// which provider/model it's bound to.
    pub chat_model_name: String,
}

impl Default for PipelineTunables {
    fn default() -> Self {
        Self {
            context_budget_tokens: agentflow_core::config::DEFAULT_CONTEXT_BUDGET,
            summary_model: agentflow_core::config::DEFAULT_SUMMARY_MODEL.to_string(),
            chat_model_name: agentflow_core::config::DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

/// Bundles everything a node needs beyond the state it's handed: the bound
/// chat model, the (possibly distinct, cheaper) summarization model, the
/// tool set, and tunables. One instance is built per pipeline run.
pub struct PipelineDeps {
    pub chat_model: Arc<dyn ChatModel>,
    pub summarizer: Arc<dyn ChatModel>,
    pub tools: Vec<Arc<dyn Tool>>,
    pub tunables: PipelineTunables,
    #[cfg(feature = "hooks")]
    pub hooks: Option<Arc<HookEngine>>,
}

impl PipelineDeps {
    pub fn new(chat_model: Arc<dyn ChatModel>, summarizer: Arc<dyn ChatModel>) -> Self {
        Self {
            chat_model,
            summarizer,
            tools: Vec::new(),
            tunables: PipelineTunables::default(),
            #[cfg(feature = "hooks")]
            hooks: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tunables(mut self, tunables: PipelineTunables) -> Self {
        self.tunables = tunables;
        self
    }

    #[cfg(feature = "hooks")]
    pub fn with_hooks(mut self, hooks: Arc<HookEngine>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    pub fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().name == name)
    }
}
