// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use super::{Node, NodeType};
use crate::error::FlowError;
use crate::state::WorkflowState;

/// Entry node that merges a fixed initial payload into the state.
///
/// Every graph has exactly one entry; an empty `initial_data` map makes the
/// node a pure pass-through.
pub struct StartNode {
    id: String,
    name: String,
    initial_data: HashMap<String, Value>,
}

impl StartNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            initial_data: HashMap::new(),
        }
    }

    /// Set the payload merged into the state when the run begins
    pub fn with_initial_data(mut self, data: HashMap<String, Value>) -> Self {
        self.initial_data = data;
        self
    }
}

#[async_trait]
impl Node for StartNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> NodeType {
        NodeType::Start
    }

    fn validate(&self) -> Result<(), FlowError> {
        if self.id.is_empty() {
            return Err(FlowError::validation("start node id must not be empty"));
        }
        Ok(())
    }

    async fn execute(&self, state: &WorkflowState) -> Result<WorkflowState, FlowError> {
        let mut next = state.clone();
        if !self.initial_data.is_empty() {
            next.set_multiple(self.initial_data.clone());
        }
        log::debug!("start node '{}' initialized state {}", self.id, next.id());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_merges_initial_data() {
        let node = StartNode::new("start", "Start").with_initial_data(HashMap::from([
            ("stage".to_string(), json!("intake")),
            ("retries".to_string(), json!(0)),
        ]));

        let mut input = WorkflowState::new("g");
        input.set("query", json!("hotels in Rome"));

        let out = node.execute(&input).await.unwrap();
        assert_eq!(out.get("stage"), Some(&json!("intake")));
        assert_eq!(out.get("query"), Some(&json!("hotels in Rome")));
        // Input is untouched
        assert!(input.get("stage").is_none());
    }

    #[tokio::test]
    async fn test_empty_initial_data_is_pass_through() {
        let node = StartNode::new("start", "Start");
        let input = WorkflowState::new("g");
        let version = input.version();

        let out = node.execute(&input).await.unwrap();
        assert_eq!(out.version(), version);
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        assert!(StartNode::new("", "Start").validate().is_err());
        assert!(StartNode::new("start", "Start").validate().is_ok());
    }
}
