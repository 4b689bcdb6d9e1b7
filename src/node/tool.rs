// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{Node, NodeType};
use crate::error::FlowError;
use crate::state::WorkflowState;
use crate::tool::ToolRegistry;

/// Node that invokes a named capability from the tool registry.
///
/// Only whitelisted `input_keys` present in the payload are collected into
/// the tool's input bag. The result lands under `output_key`, with an audit
/// record under `tool_call:<id>` in the metadata side channel. An unknown
/// tool name fails the run before any call is made.
pub struct ToolNode {
    id: String,
    name: String,
    tool_name: String,
    input_keys: Vec<String>,
    output_key: String,
    registry: Arc<ToolRegistry>,
}

impl ToolNode {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tool_name: impl Into<String>,
        output_key: impl Into<String>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tool_name: tool_name.into(),
            input_keys: Vec::new(),
            output_key: output_key.into(),
            registry,
        }
    }

    /// Whitelist the payload keys passed to the tool
    pub fn with_input_keys(mut self, keys: Vec<String>) -> Self {
        self.input_keys = keys;
        self
    }
}

#[async_trait]
impl Node for ToolNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> NodeType {
        NodeType::Tool
    }

    fn validate(&self) -> Result<(), FlowError> {
        if self.id.is_empty() {
            return Err(FlowError::validation("tool node id must not be empty"));
        }
        if self.tool_name.is_empty() {
            return Err(FlowError::validation(format!(
                "tool node '{}' has an empty tool name",
                self.id
            )));
        }
        if self.output_key.is_empty() {
            return Err(FlowError::validation(format!(
                "tool node '{}' has an empty output key",
                self.id
            )));
        }
        Ok(())
    }

    async fn execute(&self, state: &WorkflowState) -> Result<WorkflowState, FlowError> {
        let mut next = state.clone();

        let tool = self
            .registry
            .get(&self.tool_name)
            .await
            .ok_or_else(|| FlowError::not_found("tool", &self.tool_name))?;

        let mut inputs = Map::new();
        for key in &self.input_keys {
            if let Some(value) = next.get(key) {
                inputs.insert(key.clone(), value.clone());
            }
        }
        let inputs = Value::Object(inputs);

        log::info!("tool node '{}' invoking '{}'", self.id, self.tool_name);
        let result = tool.execute(inputs.clone()).await?;

        next.set(self.output_key.clone(), result.clone());
        next.set_metadata(
            format!("tool_call:{}", self.id),
            json!({
                "node_id": self.id,
                "tool": self.tool_name,
                "inputs": inputs,
                "result": result,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        );

        Ok(next)
    }
}
