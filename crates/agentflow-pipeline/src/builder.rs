//! Graph builder (C5) — wires `input_guard`, `memory_loader`, `llm_agent`,
//! `cost_tracker`, `reject`, and (only when tools are configured) `tools`,
//! per spec.md §4.3.

use std::sync::Arc;

use agentflow_graph::{CompiledGraph, GraphBuilder, GraphError, Result as GraphBuildResult};

use crate::deps::PipelineDeps;
use crate::nodes::{self, cost_tracker, input_guard, llm_agent, memory_loader, reject, tools};
use crate::state::PipelineState;

/// Wrap a node's `Result<Partial, PipelineError>` into the graph executor's
/// own `Result<Partial, GraphError>`, tagging the failure with the node's
/// name the way `CompiledGraph::invoke` does for panics-as-errors.
fn into_graph_result<T>(node: &'static str, result: crate::GraphResult<T>) -> GraphBuildResult<T> {
    result.map_err(|e| GraphError::NodeFailed {
        node: node.to_string(),
        source: Box::new(e),
    })
}

pub fn build_graph(deps: Arc<PipelineDeps>) -> GraphBuildResult<CompiledGraph<PipelineState>> {
    let has_tools = deps.has_tools();

    let mut builder = GraphBuilder::new()
        .add_node(
            nodes::INPUT_GUARD,
            Arc::new(|state: PipelineState| {
                Box::pin(async move { into_graph_result(nodes::INPUT_GUARD, input_guard::run(state).await) })
            }),
        )
        .add_node(nodes::REJECT, {
            Arc::new(|state: PipelineState| {
                Box::pin(async move { into_graph_result(nodes::REJECT, reject::run(state).await) })
            })
        })
        .add_node(nodes::MEMORY_LOADER, {
            let deps = deps.clone();
            Arc::new(move |state: PipelineState| {
                let deps = deps.clone();
                Box::pin(async move {
                    into_graph_result(nodes::MEMORY_LOADER, memory_loader::run(deps, state).await)
                })
            })
        })
        .add_node(nodes::LLM_AGENT, {
            let deps = deps.clone();
            Arc::new(move |state: PipelineState| {
                let deps = deps.clone();
                Box::pin(async move { into_graph_result(nodes::LLM_AGENT, llm_agent::run(deps, state).await) })
            })
        })
        .add_node(nodes::COST_TRACKER, {
            Arc::new(|state: PipelineState| {
                Box::pin(async move { into_graph_result(nodes::COST_TRACKER, cost_tracker::run(state).await) })
            })
        })
        .set_entry(nodes::INPUT_GUARD)
        .add_conditional_edges(nodes::INPUT_GUARD, Arc::new(input_guard::route))
        .add_edge(nodes::MEMORY_LOADER, nodes::LLM_AGENT);
    // `reject` and `cost_tracker` have no outgoing edge registered, which the
    // executor treats as a terminal node (equivalent to routing to `END`).

    if has_tools {
        builder = builder
            .add_node(nodes::TOOLS, {
                let deps = deps.clone();
                Arc::new(move |state: PipelineState| {
                    let deps = deps.clone();
                    Box::pin(async move { into_graph_result(nodes::TOOLS, tools::run(deps, state).await) })
                })
            })
            .add_conditional_edges(nodes::LLM_AGENT, Arc::new(llm_agent::route(true)))
            .add_edge(nodes::TOOLS, nodes::LLM_AGENT);
    } else {
        builder = builder.add_conditional_edges(nodes::LLM_AGENT, Arc::new(llm_agent::route(false)));
    }

    builder.compile()
}
