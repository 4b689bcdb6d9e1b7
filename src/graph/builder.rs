// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::{Edge, Graph};
use crate::condition::Condition;
use crate::error::FlowError;
use crate::node::Node;

/// Fluent builder assembling a [`Graph`].
///
/// The builder keeps a "current node" cursor: `add_node` moves it to the
/// added node, `connect_to` appends an edge from the cursor and advances it,
/// `connect_to_if` appends a guarded edge without moving so several
/// conditional branches can fan out from one source, and `from` repositions
/// it explicitly. Construction errors (duplicate ids) are deferred and
/// surfaced by `build()`, which also runs full graph validation.
///
/// Calling a connect method before any node is current is a programmer
/// error and panics.
pub struct GraphBuilder {
    graph: Graph,
    current: Option<String>,
    error: Option<FlowError>,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id, name),
            current: None,
            error: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.graph.set_description(description);
        self
    }

    /// Add a node and move the cursor to it
    pub fn add_node(mut self, node: Arc<dyn Node>) -> Self {
        let id = node.id().to_string();
        if let Err(err) = self.graph.add_node(node) {
            self.record_error(err);
            return self;
        }
        self.current = Some(id);
        self
    }

    /// Append an unconditional edge from the cursor and advance to `target`
    pub fn connect_to(mut self, target: impl Into<String>) -> Self {
        let target = target.into();
        let from = self.expect_current("connect_to");
        self.graph.add_edge(Edge::new(from, target.clone()));
        self.current = Some(target);
        self
    }

    /// Append a guarded edge from the cursor without moving it, so further
    /// branches can be attached to the same source
    pub fn connect_to_if(mut self, target: impl Into<String>, condition: Condition) -> Self {
        let from = self.expect_current("connect_to_if");
        self.graph
            .add_edge(Edge::new(from, target).with_condition(condition));
        self
    }

    /// Reposition the cursor to an already-added node id
    #[allow(clippy::should_implement_trait)]
    pub fn from(mut self, node_id: impl Into<String>) -> Self {
        self.current = Some(node_id.into());
        self
    }

    /// Append an explicit unconditional edge, leaving the cursor alone
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.add_edge(Edge::new(from, to));
        self
    }

    /// Append an explicit guarded edge, leaving the cursor alone
    pub fn edge_if(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: Condition,
    ) -> Self {
        self.graph
            .add_edge(Edge::new(from, to).with_condition(condition));
        self
    }

    /// Record the entry node id, resolved at build time
    pub fn entry_point(mut self, node_id: impl Into<String>) -> Self {
        self.graph.set_entry_point(node_id);
        self
    }

    /// Record an exit node id, resolved at build time
    pub fn exit_point(mut self, node_id: impl Into<String>) -> Self {
        self.graph.add_exit_point(node_id);
        self
    }

    /// Validate and return the assembled graph
    pub fn build(self) -> Result<Graph, FlowError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.graph.validate()?;
        log::info!(
            "built graph '{}' with {} nodes and {} edges",
            self.graph.id(),
            self.graph.node_count(),
            self.graph.edge_count()
        );
        Ok(self.graph)
    }

    fn expect_current(&self, method: &str) -> String {
        match &self.current {
            Some(id) => id.clone(),
            None => panic!("GraphBuilder::{} called before any node is current", method),
        }
    }

    fn record_error(&mut self, err: FlowError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::node::{EndNode, FunctionNode, StartNode};
    use serde_json::json;

    fn start(id: &str) -> Arc<dyn Node> {
        Arc::new(StartNode::new(id, id))
    }

    fn end(id: &str) -> Arc<dyn Node> {
        Arc::new(EndNode::new(id, id))
    }

    fn func(id: &str) -> Arc<dyn Node> {
        Arc::new(FunctionNode::new(id, id, Ok))
    }

    #[test]
    fn test_linear_build() {
        let graph = GraphBuilder::new("g", "linear")
            .add_node(start("start"))
            .add_node(func("work"))
            .add_node(end("end"))
            .from("start")
            .connect_to("work")
            .connect_to("end")
            .entry_point("start")
            .exit_point("end")
            .build()
            .unwrap();

        assert_eq!(graph.entry_point(), Some("start"));
        assert_eq!(graph.edges_from("start")[0].to(), "work");
        assert_eq!(graph.edges_from("work")[0].to(), "end");
    }

    #[test]
    fn test_connect_to_if_keeps_cursor_for_fan_out() {
        let graph = GraphBuilder::new("g", "branching")
            .add_node(start("router"))
            .add_node(end("cheap"))
            .add_node(end("premium"))
            .from("router")
            .connect_to_if("premium", Condition::equals("tier", json!("gold")))
            .connect_to_if("cheap", Condition::always_true())
            .entry_point("router")
            .exit_point("cheap")
            .exit_point("premium")
            .build()
            .unwrap();

        // Both edges hang off "router", in registration order
        let edges = graph.edges_from("router");
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].to(), "premium");
        assert_eq!(edges[1].to(), "cheap");
    }

    #[test]
    fn test_explicit_edges() {
        let graph = GraphBuilder::new("g", "explicit")
            .add_node(start("a"))
            .add_node(end("b"))
            .edge("a", "b")
            .edge_if("a", "b", Condition::always_false())
            .entry_point("a")
            .exit_point("b")
            .build()
            .unwrap();

        assert_eq!(graph.edges_from("a").len(), 2);
    }

    #[test]
    fn test_duplicate_node_surfaces_at_build() {
        let result = GraphBuilder::new("g", "dup")
            .add_node(start("a"))
            .add_node(start("a"))
            .entry_point("a")
            .exit_point("a")
            .build();

        assert!(matches!(result, Err(FlowError::Validation(_))));
    }

    #[test]
    fn test_build_runs_validation() {
        let result = GraphBuilder::new("g", "no-exit")
            .add_node(start("a"))
            .entry_point("a")
            .build();

        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "before any node is current")]
    fn test_connect_without_cursor_panics() {
        let _ = GraphBuilder::new("g", "broken").connect_to("anywhere");
    }
}
