// SPDX-License-Identifier: MIT

//! Node abstraction and the built-in node variants
//!
//! A node is a unit of work that transforms a `WorkflowState`. Every variant
//! clones its input and mutates the clone, so the executor can keep earlier
//! snapshots as checkpoints. Variants:
//! - [`StartNode`] - merges a fixed initial payload; the graph's entry
//! - [`EndNode`] - optional finalizer callback; an exit node
//! - [`LlmNode`] - renders a prompt and calls a text-generation provider
//! - [`ToolNode`] - invokes a named capability from the registry
//! - [`FunctionNode`] - wraps a native state transform
//! - [`ConditionalNode`] - evaluates a predicate into branch flag keys

mod conditional;
mod end;
mod function;
mod llm;
mod start;
pub(crate) mod template;
mod tool;

pub use conditional::ConditionalNode;
pub use end::EndNode;
pub use function::FunctionNode;
pub use llm::LlmNode;
pub use start::StartNode;
pub use tool::ToolNode;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FlowError;
use crate::state::WorkflowState;

/// Static type tag of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    End,
    Llm,
    Tool,
    Function,
    Conditional,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Start => "start",
            NodeType::End => "end",
            NodeType::Llm => "llm",
            NodeType::Tool => "tool",
            NodeType::Function => "function",
            NodeType::Conditional => "conditional",
        };
        write!(f, "{}", name)
    }
}

/// Trait for executable workflow nodes.
///
/// Identity is fixed at construction time; `validate()` is called by
/// `Graph::validate` before the node can ever execute. `execute` receives
/// the current state by reference and returns a new state, leaving the
/// input untouched.
#[async_trait]
pub trait Node: Send + Sync {
    /// Unique identifier within a graph
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Static type tag
    fn node_type(&self) -> NodeType;

    /// Check configuration before the graph is marked buildable
    fn validate(&self) -> Result<(), FlowError>;

    /// Transform the state, returning a new snapshot
    async fn execute(&self, state: &WorkflowState) -> Result<WorkflowState, FlowError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_display() {
        assert_eq!(NodeType::Start.to_string(), "start");
        assert_eq!(NodeType::Llm.to_string(), "llm");
        assert_eq!(NodeType::Conditional.to_string(), "conditional");
    }

    #[test]
    fn test_node_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&NodeType::Tool).unwrap(), "\"tool\"");
        let parsed: NodeType = serde_json::from_str("\"function\"").unwrap();
        assert_eq!(parsed, NodeType::Function);
    }
}
