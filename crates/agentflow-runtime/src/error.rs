use thiserror::Error;

use agentflow_graph::GraphError;
use agentflow_store::StoreError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("graph execution error: {0}")]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
