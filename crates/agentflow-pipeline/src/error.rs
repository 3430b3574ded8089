use agentflow_store::ChatModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("chat model error: {0}")]
    ChatModel(#[from] ChatModelError),

    #[error("graph execution error: {0}")]
    Graph(#[from] agentflow_graph::GraphError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
