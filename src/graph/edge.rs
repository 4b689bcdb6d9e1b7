// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::condition::Condition;
use crate::error::FlowError;
use crate::state::WorkflowState;

/// A directed transition between two nodes, optionally guarded.
///
/// Edges from one source form an if/else-if chain evaluated in registration
/// order; an unguarded edge always matches.
#[derive(Clone)]
pub struct Edge {
    from: String,
    to: String,
    condition: Option<Condition>,
    label: Option<String>,
    weight: f64,
    metadata: HashMap<String, Value>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: None,
            label: None,
            weight: 1.0,
            metadata: HashMap::new(),
        }
    }

    /// Guard the edge with a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Informational weight, unused by edge resolution
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Whether the edge matches the state; unguarded edges always do
    pub fn matches(&self, state: &WorkflowState) -> Result<bool, FlowError> {
        match &self.condition {
            None => Ok(true),
            Some(condition) => condition.evaluate(state),
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field(
                "condition",
                &self.condition.as_ref().map(|c| c.describe()),
            )
            .field("label", &self.label)
            .finish()
    }
}
