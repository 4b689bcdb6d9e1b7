// SPDX-License-Identifier: MIT

//! # tripflow-rs
//!
//! Graph-based orchestration engine for multi-step, state-carrying
//! workflows. Steps may call external capabilities (text-generation
//! providers, named tools) or run native transformation logic, with
//! conditional branching between steps.
//!
//! The moving parts:
//! - **WorkflowState** - a versioned key/value document flowing through a run
//! - **Condition** - a composable boolean predicate tree over a state
//! - **Node** - polymorphic units of work (start, end, llm, tool, function,
//!   conditional)
//! - **Graph** / **GraphBuilder** - the validated DAG and its fluent builder
//! - **StateManager** - the checkpoint persistence boundary
//! - **GraphExecutor** - the bounded execution loop with timeout,
//!   cancellation, async invocation, and an auditable run ledger
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use tripflow_rs::{
//!     ExecutionOptions, FunctionNode, GraphBuilder, GraphExecutor,
//!     InMemoryStateManager, StartNode, EndNode,
//! };
//!
//! let graph = GraphBuilder::new("trip-planner", "Trip planner")
//!     .add_node(Arc::new(StartNode::new("start", "Start")))
//!     .add_node(Arc::new(FunctionNode::new("plan", "Plan", |mut state| {
//!         state.set("plan", serde_json::json!("3 days in Lisbon"));
//!         Ok(state)
//!     })))
//!     .add_node(Arc::new(EndNode::new("end", "End")))
//!     .from("start")
//!     .connect_to("plan")
//!     .connect_to("end")
//!     .entry_point("start")
//!     .exit_point("end")
//!     .build()?;
//!
//! let executor = GraphExecutor::new(Arc::new(InMemoryStateManager::new()));
//! let result = executor
//!     .execute(&graph, HashMap::new(), ExecutionOptions::default())
//!     .await;
//! ```

pub mod condition;
pub mod error;
pub mod executor;
pub mod graph;
pub mod model;
pub mod node;
pub mod state;
pub mod tool;

pub use condition::{CompareOp, Condition};
pub use error::FlowError;
pub use executor::{
    ExecutionOptions, ExecutionResult, ExecutionStats, ExecutionStatus, GraphExecutor,
};
pub use graph::{Edge, Graph, GraphBuilder};
pub use model::{GenerationRequest, TextGenerator, ToolSpec};
pub use node::{
    ConditionalNode, EndNode, FunctionNode, LlmNode, Node, NodeType, StartNode, ToolNode,
};
pub use state::{InMemoryStateManager, StateFilter, StateManager, WorkflowState};
pub use tool::{Tool, ToolRegistry};
