// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;

use super::{Node, NodeType};
use crate::condition::Condition;
use crate::error::FlowError;
use crate::state::WorkflowState;

/// Node that evaluates a predicate into branch flag keys.
///
/// The boolean result is written as `true` under the matching flag key and
/// the opposite flag is cleared. The node never selects the next hop itself;
/// outgoing edges test the flags (or any other predicate) to branch.
pub struct ConditionalNode {
    id: String,
    name: String,
    condition: Condition,
    true_key: String,
    false_key: String,
}

impl ConditionalNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, condition: Condition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            condition,
            true_key: "branch_true".to_string(),
            false_key: "branch_false".to_string(),
        }
    }

    /// Override the default `branch_true`/`branch_false` flag keys
    pub fn with_flag_keys(
        mut self,
        true_key: impl Into<String>,
        false_key: impl Into<String>,
    ) -> Self {
        self.true_key = true_key.into();
        self.false_key = false_key.into();
        self
    }
}

#[async_trait]
impl Node for ConditionalNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> NodeType {
        NodeType::Conditional
    }

    fn validate(&self) -> Result<(), FlowError> {
        if self.id.is_empty() {
            return Err(FlowError::validation(
                "conditional node id must not be empty",
            ));
        }
        if self.true_key.is_empty() || self.false_key.is_empty() {
            return Err(FlowError::validation(format!(
                "conditional node '{}' has an empty flag key",
                self.id
            )));
        }
        if self.true_key == self.false_key {
            return Err(FlowError::validation(format!(
                "conditional node '{}' uses the same key for both flags",
                self.id
            )));
        }
        Ok(())
    }

    async fn execute(&self, state: &WorkflowState) -> Result<WorkflowState, FlowError> {
        let mut next = state.clone();

        let outcome = self.condition.evaluate(&next)?;
        log::debug!(
            "conditional node '{}' evaluated [{}] to {}",
            self.id,
            self.condition.describe(),
            outcome
        );

        if outcome {
            next.set(self.true_key.clone(), json!(true));
            next.delete(&self.false_key);
        } else {
            next.set(self.false_key.clone(), json!(true));
            next.delete(&self.true_key);
        }

        Ok(next)
    }
}
