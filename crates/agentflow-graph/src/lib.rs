pub mod error;
pub mod graph;

pub use error::{GraphError, Result};
pub use graph::{CompiledGraph, GraphBuilder, GraphEvent, GraphState, NodeFn, RouterFn, END};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        value: i32,
        visited: Vec<String>,
    }

    #[derive(Clone, Debug, Default)]
    struct CounterPartial {
        delta: Option<i32>,
        visited: Option<String>,
    }

    impl GraphState for Counter {
        type Partial = CounterPartial;

        fn merge(&mut self, partial: Self::Partial) {
            if let Some(delta) = partial.delta {
                self.value += delta;
            }
            if let Some(node) = partial.visited {
                self.visited.push(node);
            }
        }
    }

    fn node(name: &'static str, delta: i32) -> NodeFn<Counter> {
        Arc::new(move |_state: Counter| {
            Box::pin(async move {
                Ok(CounterPartial {
                    delta: Some(delta),
                    visited: Some(name.to_string()),
                })
            })
        })
    }

    #[tokio::test]
    async fn invoke_runs_linear_chain_to_completion() {
        let graph = GraphBuilder::new()
            .add_node("a", node("a", 1))
            .add_node("b", node("b", 10))
            .set_entry("a")
            .add_edge("a", "b")
            .compile()
            .unwrap();

        let result = graph.invoke(Counter::default()).await.unwrap();
        assert_eq!(result.value, 11);
        assert_eq!(result.visited, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn conditional_edge_can_terminate_early() {
        let graph = GraphBuilder::new()
            .add_node("guard", node("guard", 0))
            .add_node("work", node("work", 5))
            .set_entry("guard")
            .add_conditional_edges(
                "guard",
                Arc::new(|s: &Counter| {
                    if s.value == 0 {
                        END.to_string()
                    } else {
                        "work".to_string()
                    }
                }),
            )
            .compile()
            .unwrap();

        let result = graph.invoke(Counter::default()).await.unwrap();
        assert_eq!(result.visited, vec!["guard"]);
        assert_eq!(result.value, 0);
    }

    #[tokio::test]
    async fn unknown_route_target_is_an_error() {
        let graph = GraphBuilder::new()
            .add_node("a", node("a", 1))
            .set_entry("a")
            .add_conditional_edges("a", Arc::new(|_: &Counter| "nowhere".to_string()))
            .compile()
            .unwrap();

        let err = graph.invoke(Counter::default()).await.unwrap_err();
        assert!(matches!(err, GraphError::UnknownRoute { .. }));
    }

    #[tokio::test]
    async fn stream_yields_one_event_per_node() {
        use futures_util::StreamExt;

        let graph = Arc::new(
            GraphBuilder::new()
                .add_node("a", node("a", 1))
                .add_node("b", node("b", 2))
                .set_entry("a")
                .add_edge("a", "b")
                .compile()
                .unwrap(),
        );

        let mut events = graph.stream(Counter::default());
        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first.node, "a");
        let second = events.next().await.unwrap().unwrap();
        assert_eq!(second.node, "b");
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn missing_entry_point_fails_to_compile() {
        let err = GraphBuilder::<Counter>::new()
            .add_node("a", node("a", 1))
            .compile()
            .unwrap_err();
        assert!(matches!(err, GraphError::NoEntryPoint));
    }
}
