//! Recursive condition evaluator

use serde_json::Value;

use super::ast::{CompareOp, Condition};
use crate::error::FlowError;
use crate::state::WorkflowState;

/// Evaluate a condition tree against a workflow state
pub fn evaluate(condition: &Condition, state: &WorkflowState) -> Result<bool, FlowError> {
    match condition {
        Condition::Always(value) => Ok(*value),
        Condition::Value { key, op, expected } => evaluate_leaf(key, *op, expected, state),
        Condition::And(children) => {
            for child in children {
                if !evaluate(child, state)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Or(children) => {
            for child in children {
                if evaluate(child, state)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Not(child) => Ok(!evaluate(child, state)?),
        Condition::Custom { predicate, .. } => Ok(predicate(state)),
    }
}

fn evaluate_leaf(
    key: &str,
    op: CompareOp,
    expected: &Value,
    state: &WorkflowState,
) -> Result<bool, FlowError> {
    let actual = state.get(key);

    match op {
        CompareOp::Exists => Ok(actual.is_some()),
        CompareOp::NotExists => Ok(actual.is_none()),
        CompareOp::Equals => Ok(actual == Some(expected)),
        CompareOp::NotEquals => Ok(actual != Some(expected)),
        CompareOp::Greater => compare_numeric(key, actual, expected, |a, b| a > b),
        CompareOp::Less => compare_numeric(key, actual, expected, |a, b| a < b),
        CompareOp::Contains => check_contains(key, actual, expected),
    }
}

/// Numeric comparison with coercion. A missing key is simply false;
/// present but non-numeric operands are a typed coercion error.
fn compare_numeric<F>(
    key: &str,
    actual: Option<&Value>,
    expected: &Value,
    cmp: F,
) -> Result<bool, FlowError>
where
    F: Fn(f64, f64) -> bool,
{
    let Some(actual) = actual else {
        return Ok(false);
    };

    let left = coerce_number(actual).ok_or_else(|| {
        FlowError::type_coercion(format!("value of '{}' is not numeric: {}", key, actual))
    })?;
    let right = coerce_number(expected).ok_or_else(|| {
        FlowError::type_coercion(format!(
            "expected value for '{}' is not numeric: {}",
            key, expected
        ))
    })?;

    Ok(cmp(left, right))
}

/// Coerce a JSON value to f64: numbers directly, strings by parsing
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn check_contains(key: &str, actual: Option<&Value>, expected: &Value) -> Result<bool, FlowError> {
    let Some(actual) = actual else {
        return Ok(false);
    };

    match (actual, expected) {
        // Substring test on text
        (Value::String(s), Value::String(needle)) => Ok(s.contains(needle.as_str())),
        // Element membership on sequences, by structural equality
        (Value::Array(items), needle) => Ok(items.iter().any(|item| item == needle)),
        // Key presence on maps
        (Value::Object(map), Value::String(field)) => Ok(map.contains_key(field)),
        (Value::Object(_), other) => Err(FlowError::type_coercion(format!(
            "map key for '{}' must be a string, got {}",
            key, other
        ))),
        (other, _) => Err(FlowError::type_coercion(format!(
            "'{}' does not support contains: {}",
            key, other
        ))),
    }
}
