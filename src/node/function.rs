// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use super::{Node, NodeType};
use crate::error::FlowError;
use crate::state::WorkflowState;

/// Native state transform wrapped by [`FunctionNode`]
pub type StateTransform =
    Arc<dyn Fn(WorkflowState) -> Result<WorkflowState, FlowError> + Send + Sync>;

/// Node that runs an arbitrary native transform for local computation.
///
/// The transform receives a clone of the current state by value and returns
/// the next snapshot; the constructor takes the closure directly, so a node
/// without a transform cannot be built.
pub struct FunctionNode {
    id: String,
    name: String,
    transform: StateTransform,
}

impl FunctionNode {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        transform: impl Fn(WorkflowState) -> Result<WorkflowState, FlowError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            transform: Arc::new(transform),
        }
    }
}

#[async_trait]
impl Node for FunctionNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> NodeType {
        NodeType::Function
    }

    fn validate(&self) -> Result<(), FlowError> {
        if self.id.is_empty() {
            return Err(FlowError::validation("function node id must not be empty"));
        }
        Ok(())
    }

    async fn execute(&self, state: &WorkflowState) -> Result<WorkflowState, FlowError> {
        log::debug!("function node '{}' transforming state", self.id);
        (self.transform)(state.clone())
    }
}
