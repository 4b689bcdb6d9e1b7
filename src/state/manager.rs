// SPDX-License-Identifier: MIT

//! Persistence boundary for state checkpoints

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::document::WorkflowState;
use crate::error::FlowError;

/// Filter for querying stored states.
///
/// The well-known correlation fields match against the document identity;
/// `data_equals` entries match payload keys by structural equality.
#[derive(Debug, Clone, Default)]
pub struct StateFilter {
    graph_id: Option<String>,
    user_id: Option<String>,
    session_id: Option<String>,
    data_equals: HashMap<String, Value>,
}

impl StateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph_id(mut self, graph_id: impl Into<String>) -> Self {
        self.graph_id = Some(graph_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_data_key(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data_equals.insert(key.into(), value);
        self
    }

    /// Check whether a state matches every constraint in the filter
    pub fn matches(&self, state: &WorkflowState) -> bool {
        if let Some(graph_id) = &self.graph_id {
            if state.graph_id() != graph_id {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if state.user_id() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(session_id) = &self.session_id {
            if state.session_id() != Some(session_id.as_str()) {
                return false;
            }
        }
        self.data_equals
            .iter()
            .all(|(key, expected)| state.get(key) == Some(expected))
    }
}

/// Storage boundary for state snapshots.
///
/// Implementations must hand back independent clones on both save and load,
/// so a caller can never corrupt the store's copy by mutating a returned
/// state.
#[async_trait]
pub trait StateManager: Send + Sync {
    /// Persist an independent clone of the state, keyed by its id
    async fn save_state(&self, state: &WorkflowState) -> Result<(), FlowError>;

    /// Load a clone of a stored state, or fail with NotFound
    async fn load_state(&self, state_id: &str) -> Result<WorkflowState, FlowError>;

    /// Remove a stored state, or fail with NotFound
    async fn delete_state(&self, state_id: &str) -> Result<(), FlowError>;

    /// Return clones of every stored state matching the filter
    async fn list_states(&self, filter: &StateFilter) -> Result<Vec<WorkflowState>, FlowError>;
}

/// Reference in-memory store guarded by a single reader/writer lock.
///
/// Data is lost when the process exits; production deployments substitute
/// their own `StateManager` behind the same trait.
#[derive(Clone)]
pub struct InMemoryStateManager {
    states: Arc<RwLock<HashMap<String, WorkflowState>>>,
}

impl InMemoryStateManager {
    pub fn new() -> Self {
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored states
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }

    /// Drop every stored state
    pub async fn clear(&self) {
        self.states.write().await.clear();
    }
}

impl Default for InMemoryStateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateManager for InMemoryStateManager {
    async fn save_state(&self, state: &WorkflowState) -> Result<(), FlowError> {
        let mut states = self.states.write().await;
        log::debug!("saving state {} (version {})", state.id(), state.version());
        states.insert(state.id().to_string(), state.clone());
        Ok(())
    }

    async fn load_state(&self, state_id: &str) -> Result<WorkflowState, FlowError> {
        let states = self.states.read().await;
        states
            .get(state_id)
            .cloned()
            .ok_or_else(|| FlowError::not_found("state", state_id))
    }

    async fn delete_state(&self, state_id: &str) -> Result<(), FlowError> {
        let mut states = self.states.write().await;
        states
            .remove(state_id)
            .map(|_| ())
            .ok_or_else(|| FlowError::not_found("state", state_id))
    }

    async fn list_states(&self, filter: &StateFilter) -> Result<Vec<WorkflowState>, FlowError> {
        let states = self.states.read().await;
        Ok(states
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }
}
