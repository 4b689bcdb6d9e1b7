// SPDX-License-Identifier: MIT

//! Typed error handling for tripflow-rs
//!
//! Every failure the engine can surface maps onto one of these variants,
//! so callers can distinguish build-time validation problems from runtime
//! collaborator failures without string matching.

use thiserror::Error;

/// Top-level error type for the workflow engine
#[derive(Debug, Error)]
pub enum FlowError {
    /// Malformed graph, node, or condition caught before execution
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced state, node, tool, or execution does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// Operands of a comparison could not be coerced to compatible types
    #[error("type coercion error: {0}")]
    TypeCoercion(String),

    /// An external text-generation or tool collaborator failed
    #[error("external call to '{provider}' failed: {message}")]
    ExternalCall { provider: String, message: String },

    /// The hop-count guard tripped before the run reached an exit
    #[error("iteration budget of {limit} exceeded")]
    IterationBudget { limit: u32 },

    /// The run was cancelled or timed out
    #[error("execution cancelled: {0}")]
    Cancelled(String),

    /// A checkpoint write or read against the state store failed
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for a kind of entity ("state", "node", "tool", ...)
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a type coercion error
    pub fn type_coercion(message: impl Into<String>) -> Self {
        Self::TypeCoercion(message.into())
    }

    /// Create an external call error
    pub fn external_call(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalCall {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled(message.into())
    }

    /// Create a checkpoint error
    pub fn checkpoint(message: impl Into<String>) -> Self {
        Self::Checkpoint(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlowError::not_found("node", "summarize");
        assert_eq!(err.to_string(), "node 'summarize' not found");

        let err = FlowError::validation("graph has no entry point");
        assert_eq!(err.to_string(), "validation error: graph has no entry point");

        let err = FlowError::external_call("openai", "quota exhausted");
        assert_eq!(
            err.to_string(),
            "external call to 'openai' failed: quota exhausted"
        );

        let err = FlowError::IterationBudget { limit: 50 };
        assert_eq!(err.to_string(), "iteration budget of 50 exceeded");
    }

    #[test]
    fn test_json_error_converts() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: FlowError = parse_err.into();
        assert!(matches!(err, FlowError::Json(_)));
    }
}
