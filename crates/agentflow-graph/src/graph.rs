use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{GraphError, Result};

/// Name of the synthetic node the executor treats as "run finished".
pub const END: &str = "__end__";

/// A unit of graph state that can be produced incrementally by nodes.
///
/// Nodes never mutate state directly — they return a `Partial` describing
/// what changed, and the executor merges it into the running state via
/// [`GraphState::merge`]. This mirrors how a reducer-based state graph keeps
/// merge semantics explicit and field-specific rather than a generic deep
/// merge.
pub trait GraphState: Clone + Send + Sync + 'static {
    type Partial: Clone + Send + Sync + 'static;

    fn merge(&mut self, partial: Self::Partial);
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A node is an async function from the current state to a partial update.
pub type NodeFn<S> =
    Arc<dyn Fn(S) -> BoxFuture<'static, Result<<S as GraphState>::Partial>> + Send + Sync>;

/// A conditional router inspects the state after a node ran and returns the
/// name of the next node (or [`END`]).
pub type RouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

enum Edge<S: GraphState> {
    Direct(String),
    Conditional(RouterFn<S>),
}

/// One step of a graph run, surfaced by [`CompiledGraph::stream`].
#[derive(Clone)]
pub struct GraphEvent<S: GraphState> {
    pub node: String,
    pub partial: S::Partial,
}

/// Builds a [`CompiledGraph`] by registering nodes and edges, LangGraph-style.
pub struct GraphBuilder<S: GraphState> {
    nodes: HashMap<String, NodeFn<S>>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
    step_limit: usize,
}

impl<S: GraphState> GraphBuilder<S> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
            step_limit: 64,
        }
    }

    /// Upper bound on node executions in a single run, guarding against a
    /// tool-calling loop that never terminates.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn add_node(mut self, name: &str, f: NodeFn<S>) -> Self {
        self.nodes.insert(name.to_string(), f);
        self
    }

    pub fn set_entry(mut self, name: &str) -> Self {
        self.entry = Some(name.to_string());
        self
    }

    /// Unconditional edge: after `from` runs, always continue at `to`.
    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .insert(from.to_string(), Edge::Direct(to.to_string()));
        self
    }

    /// Conditional edge: after `from` runs, `router` decides the next node
    /// (or returns [`END`]) by inspecting the merged state.
    pub fn add_conditional_edges(mut self, from: &str, router: RouterFn<S>) -> Self {
        self.edges.insert(from.to_string(), Edge::Conditional(router));
        self
    }

    pub fn compile(self) -> Result<CompiledGraph<S>> {
        let entry = self.entry.ok_or(GraphError::NoEntryPoint)?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::UnknownNode(entry));
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            step_limit: self.step_limit,
        })
    }
}

impl<S: GraphState> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A graph ready to execute. Cheap to clone (everything is `Arc`-backed
/// except the edge map, which is only built once at startup).
pub struct CompiledGraph<S: GraphState> {
    nodes: HashMap<String, NodeFn<S>>,
    edges: HashMap<String, Edge<S>>,
    entry: String,
    step_limit: usize,
}

impl<S: GraphState> CompiledGraph<S> {
    fn next_node(&self, from: &str, state: &S) -> Result<Option<String>> {
        match self.edges.get(from) {
            None => Ok(None),
            Some(Edge::Direct(to)) => Ok(Some(to.clone())),
            Some(Edge::Conditional(router)) => {
                let target = router(state);
                if target == END {
                    Ok(None)
                } else if self.nodes.contains_key(&target) {
                    Ok(Some(target))
                } else {
                    Err(GraphError::UnknownRoute {
                        node: from.to_string(),
                        target,
                    })
                }
            }
        }
    }

    /// Run the graph to completion, returning the final merged state.
    pub async fn invoke(&self, mut state: S) -> Result<S> {
        let mut current = self.entry.clone();
        let mut steps = 0usize;

        loop {
            if steps >= self.step_limit {
                return Err(GraphError::StepLimitExceeded(self.step_limit));
            }
            steps += 1;

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::UnknownNode(current.clone()))?;

            trace!(node = %current, step = steps, "graph step");
            let partial = node(state.clone()).await.map_err(|e| match e {
                GraphError::NodeFailed { .. } => e,
                other => GraphError::NodeFailed {
                    node: current.clone(),
                    source: Box::new(other),
                },
            })?;
            state.merge(partial);

            match self.next_node(&current, &state)? {
                Some(next) => current = next,
                None => {
                    debug!(steps, "graph run complete");
                    return Ok(state);
                }
            }
        }
    }

    /// Run the graph, yielding a [`GraphEvent`] per node as it completes.
    /// The final state is the result of merging every yielded partial in
    /// order, same as `invoke`.
    pub fn stream(
        self: Arc<Self>,
        mut state: S,
    ) -> Pin<Box<dyn futures_util::Stream<Item = Result<GraphEvent<S>>> + Send>> {
        Box::pin(async_stream::stream! {
            let mut current = self.entry.clone();
            let mut steps = 0usize;

            loop {
                if steps >= self.step_limit {
                    yield Err(GraphError::StepLimitExceeded(self.step_limit));
                    return;
                }
                steps += 1;

                let node = match self.nodes.get(&current) {
                    Some(n) => n,
                    None => {
                        yield Err(GraphError::UnknownNode(current.clone()));
                        return;
                    }
                };

                let result = node(state.clone()).await.map_err(|e| match e {
                    GraphError::NodeFailed { .. } => e,
                    other => GraphError::NodeFailed {
                        node: current.clone(),
                        source: Box::new(other),
                    },
                });

                let partial = match result {
                    Ok(p) => p,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                state.merge(partial.clone());
                yield Ok(GraphEvent { node: current.clone(), partial });

                match self.next_node(&current, &state) {
                    Ok(Some(next)) => current = next,
                    Ok(None) => return,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }
}
