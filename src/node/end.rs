// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use super::{Node, NodeType};
use crate::error::FlowError;
use crate::state::WorkflowState;

/// Callback run over the final state when an end node executes
pub type Finalizer = Arc<dyn Fn(&mut WorkflowState) + Send + Sync>;

/// Exit node, optionally running a finalizer over the state.
///
/// A graph may declare several end nodes; a declared exit point terminates
/// the run when reached.
pub struct EndNode {
    id: String,
    name: String,
    finalizer: Option<Finalizer>,
}

impl EndNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            finalizer: None,
        }
    }

    /// Attach a finalizer invoked before the state is returned
    pub fn with_finalizer(
        mut self,
        finalizer: impl Fn(&mut WorkflowState) + Send + Sync + 'static,
    ) -> Self {
        self.finalizer = Some(Arc::new(finalizer));
        self
    }
}

#[async_trait]
impl Node for EndNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> NodeType {
        NodeType::End
    }

    fn validate(&self) -> Result<(), FlowError> {
        if self.id.is_empty() {
            return Err(FlowError::validation("end node id must not be empty"));
        }
        Ok(())
    }

    async fn execute(&self, state: &WorkflowState) -> Result<WorkflowState, FlowError> {
        let mut next = state.clone();
        if let Some(finalizer) = &self.finalizer {
            finalizer(&mut next);
        }
        log::debug!("end node '{}' finalized state {}", self.id, next.id());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_finalizer_runs_over_clone() {
        let node = EndNode::new("end", "End").with_finalizer(|state| {
            state.set("finalized", json!(true));
        });

        let input = WorkflowState::new("g");
        let out = node.execute(&input).await.unwrap();

        assert_eq!(out.get("finalized"), Some(&json!(true)));
        assert!(input.get("finalized").is_none());
    }

    #[tokio::test]
    async fn test_without_finalizer_returns_clone() {
        let node = EndNode::new("end", "End");
        let mut input = WorkflowState::new("g");
        input.set("answer", json!(42));

        let out = node.execute(&input).await.unwrap();
        assert_eq!(out.get("answer"), Some(&json!(42)));
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        assert!(EndNode::new("", "End").validate().is_err());
    }
}
