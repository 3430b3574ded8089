use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("router at node '{node}' returned unknown target: {target}")]
    UnknownRoute { node: String, target: String },

    #[error("graph has no entry point")]
    NoEntryPoint,

    #[error("node '{node}' failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("graph exceeded {0} superstep(s) without reaching a terminal node")]
    StepLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, GraphError>;
