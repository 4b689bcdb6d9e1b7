// SPDX-License-Identifier: MIT

//! Predicate tree for branching decisions

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::FlowError;
use crate::state::WorkflowState;

/// Native predicate wrapped by [`Condition::Custom`]
pub type StatePredicate = Arc<dyn Fn(&WorkflowState) -> bool + Send + Sync>;

/// Comparison operators for leaf conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Key is present
    Exists,
    /// Key is absent
    NotExists,
    /// Deep structural equality
    Equals,
    /// Deep structural inequality
    NotEquals,
    /// Numeric greater-than (operands coerced to numbers)
    Greater,
    /// Numeric less-than (operands coerced to numbers)
    Less,
    /// Substring, element membership, or key presence
    Contains,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Exists => write!(f, "exists"),
            CompareOp::NotExists => write!(f, "not_exists"),
            CompareOp::Equals => write!(f, "=="),
            CompareOp::NotEquals => write!(f, "!="),
            CompareOp::Greater => write!(f, ">"),
            CompareOp::Less => write!(f, "<"),
            CompareOp::Contains => write!(f, "contains"),
        }
    }
}

/// A boolean predicate tree over a workflow state
#[derive(Clone)]
pub enum Condition {
    /// Leaf: test a payload key against an expected value
    Value {
        key: String,
        op: CompareOp,
        expected: Value,
    },
    /// All children must be true; short-circuits on first false or error
    And(Vec<Condition>),
    /// Any child may be true; short-circuits on first true or error
    Or(Vec<Condition>),
    /// Negates its child
    Not(Box<Condition>),
    /// Constant result
    Always(bool),
    /// Native predicate escape hatch
    Custom {
        description: String,
        predicate: StatePredicate,
    },
}

impl Condition {
    /// Leaf condition testing `key op expected`
    pub fn value(key: impl Into<String>, op: CompareOp, expected: Value) -> Self {
        Self::Value {
            key: key.into(),
            op,
            expected,
        }
    }

    /// Shorthand for an existence test
    pub fn exists(key: impl Into<String>) -> Self {
        Self::value(key, CompareOp::Exists, Value::Null)
    }

    /// Shorthand for an equality test
    pub fn equals(key: impl Into<String>, expected: Value) -> Self {
        Self::value(key, CompareOp::Equals, expected)
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Self::And(children)
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Self::Or(children)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Condition) -> Self {
        Self::Not(Box::new(child))
    }

    pub fn always_true() -> Self {
        Self::Always(true)
    }

    pub fn always_false() -> Self {
        Self::Always(false)
    }

    /// Wrap a native predicate with a description for diagnostics
    pub fn custom(
        description: impl Into<String>,
        predicate: impl Fn(&WorkflowState) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the tree against a state
    pub fn evaluate(&self, state: &WorkflowState) -> Result<bool, FlowError> {
        super::evaluator::evaluate(self, state)
    }

    /// Human-readable description; composites synthesize from children
    pub fn describe(&self) -> String {
        match self {
            Condition::Value { key, op, expected } => match op {
                CompareOp::Exists | CompareOp::NotExists => format!("{} {}", key, op),
                _ => format!("{} {} {}", key, op, expected),
            },
            Condition::And(children) => {
                let parts: Vec<String> = children.iter().map(|c| c.describe()).collect();
                format!("({})", parts.join(" and "))
            }
            Condition::Or(children) => {
                let parts: Vec<String> = children.iter().map(|c| c.describe()).collect();
                format!("({})", parts.join(" or "))
            }
            Condition::Not(child) => format!("not {}", child.describe()),
            Condition::Always(value) => value.to_string(),
            Condition::Custom { description, .. } => description.clone(),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", self.describe())
    }
}
