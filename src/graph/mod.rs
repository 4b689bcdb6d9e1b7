// SPDX-License-Identifier: MIT

//! Graph assembly and validation
//!
//! A `Graph` is the read-only artifact the executor runs: a node map,
//! insertion-ordered per-source edge lists, one entry point, and one or
//! more exit points. After `validate()` succeeds the definition needs no
//! locking for concurrent reads.

mod builder;
mod edge;

pub use builder::GraphBuilder;
pub use edge::Edge;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::FlowError;
use crate::node::Node;
use crate::state::WorkflowState;

/// The assembled workflow graph
#[derive(Clone)]
pub struct Graph {
    id: String,
    name: String,
    description: String,
    nodes: HashMap<String, Arc<dyn Node>>,
    // Per-source Vec keeps registration order, which first-match scanning
    // depends on
    edges: HashMap<String, Vec<Edge>>,
    entry_point: Option<String>,
    exit_points: HashSet<String>,
}

impl Graph {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry_point: None,
            exit_points: HashSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Add a node, rejecting duplicate ids
    pub fn add_node(&mut self, node: Arc<dyn Node>) -> Result<(), FlowError> {
        let id = node.id().to_string();
        if self.nodes.contains_key(&id) {
            return Err(FlowError::validation(format!(
                "duplicate node id '{}'",
                id
            )));
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Append an edge to its source's ordered list; parallel edges allowed
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.entry(edge.from().to_string()).or_default().push(edge);
    }

    /// Record the entry node id, resolved at validate time
    pub fn set_entry_point(&mut self, node_id: impl Into<String>) {
        self.entry_point = Some(node_id.into());
    }

    /// Record an exit node id, resolved at validate time
    pub fn add_exit_point(&mut self, node_id: impl Into<String>) {
        self.exit_points.insert(node_id.into());
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn is_exit_point(&self, node_id: &str) -> bool {
        self.exit_points.contains(node_id)
    }

    pub fn get_node(&self, node_id: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.get(node_id)
    }

    /// Outgoing edges of a node in registration order
    pub fn edges_from(&self, node_id: &str) -> &[Edge] {
        self.edges.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Check structural invariants, reporting the first violation:
    /// entry point set and resolvable, at least one resolvable exit point,
    /// every edge endpoint resolvable, and every node valid.
    pub fn validate(&self) -> Result<(), FlowError> {
        let entry = self
            .entry_point
            .as_deref()
            .ok_or_else(|| FlowError::validation("graph has no entry point"))?;
        if !self.nodes.contains_key(entry) {
            return Err(FlowError::validation(format!(
                "entry point '{}' is not a node",
                entry
            )));
        }

        if self.exit_points.is_empty() {
            return Err(FlowError::validation("graph has no exit points"));
        }
        for exit in &self.exit_points {
            if !self.nodes.contains_key(exit) {
                return Err(FlowError::validation(format!(
                    "exit point '{}' is not a node",
                    exit
                )));
            }
        }

        for edges in self.edges.values() {
            for edge in edges {
                if !self.nodes.contains_key(edge.from()) {
                    return Err(FlowError::validation(format!(
                        "edge source '{}' is not a node",
                        edge.from()
                    )));
                }
                if !self.nodes.contains_key(edge.to()) {
                    return Err(FlowError::validation(format!(
                        "edge target '{}' is not a node",
                        edge.to()
                    )));
                }
            }
        }

        for node in self.nodes.values() {
            node.validate()?;
        }

        Ok(())
    }

    /// Resolve the next hop from `current`: the first outgoing edge in
    /// registration order whose condition is absent or true. `None` means
    /// natural termination.
    pub fn next_node(
        &self,
        current: &str,
        state: &WorkflowState,
    ) -> Result<Option<String>, FlowError> {
        for edge in self.edges_from(current) {
            if edge.matches(state)? {
                log::debug!(
                    "edge {} -> {} matched{}",
                    edge.from(),
                    edge.to(),
                    edge.label().map(|l| format!(" ({})", l)).unwrap_or_default()
                );
                return Ok(Some(edge.to().to_string()));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("edges", &self.edge_count())
            .field("entry_point", &self.entry_point)
            .field("exit_points", &self.exit_points)
            .finish()
    }
}
