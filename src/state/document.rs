// SPDX-License-Identifier: MIT

//! Versioned state document carried through one workflow execution

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::FlowError;

/// The key/value document that flows through a graph execution.
///
/// Every node receives a state and returns a new one; the engine keeps the
/// older snapshots as checkpoints. The payload lives in `data`, while
/// `metadata` is a side channel for diagnostics (LLM call records, tool call
/// records) that is not workflow payload.
///
/// Every mutation of payload or metadata strictly increments `version` and
/// advances `updated_at`. `Clone` produces a fully independent deep copy:
/// `serde_json::Value` owns its whole tree, so two clones never share
/// mutable substructure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    id: String,
    graph_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    data: HashMap<String, Value>,
    metadata: HashMap<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl WorkflowState {
    /// Create an empty state owned by the given graph
    pub fn new(graph_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            graph_id: graph_id.into(),
            user_id: None,
            session_id: None,
            data: HashMap::new(),
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Create a state pre-populated with an initial payload
    pub fn with_data(graph_id: impl Into<String>, data: HashMap<String, Value>) -> Self {
        let mut state = Self::new(graph_id);
        state.data = data;
        state
    }

    /// Attach a user correlation id
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach a session correlation id
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get a payload value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a payload value deserialized into a concrete type
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a payload value
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
        self.touch();
    }

    /// Set several payload values with a single version bump
    pub fn set_multiple(&mut self, entries: HashMap<String, Value>) {
        if entries.is_empty() {
            return;
        }
        self.data.extend(entries);
        self.touch();
    }

    /// Remove a payload value. Returns whether the key was present;
    /// removing a missing key does not count as a mutation.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.data.remove(key).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Check whether a payload key is present
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Iterate over payload keys
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Number of payload entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the whole payload map
    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Set a metadata entry (diagnostics side channel)
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
        self.touch();
    }

    /// Get a metadata entry
    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Borrow the whole metadata map
    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Serialize to the JSON wire document
    pub fn to_json(&self) -> Result<Value, FlowError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from the JSON wire document
    pub fn from_json(value: Value) -> Result<Self, FlowError> {
        Ok(serde_json::from_value(value)?)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_state() {
        let state = WorkflowState::new("graph-1");
        assert_eq!(state.graph_id(), "graph-1");
        assert_eq!(state.version(), 1);
        assert!(state.is_empty());
        assert!(!state.id().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut state = WorkflowState::new("g");
        state.set("destination", json!("Lisbon"));
        state.set("nights", json!(4));

        assert_eq!(state.get("destination"), Some(&json!("Lisbon")));
        assert_eq!(state.get_as::<u32>("nights"), Some(4));
        assert!(state.has("nights"));
        assert!(!state.has("missing"));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_version_increases_on_every_mutation() {
        let mut state = WorkflowState::new("g");
        let v0 = state.version();

        state.set("a", json!(1));
        assert_eq!(state.version(), v0 + 1);

        state.set_multiple(HashMap::from([
            ("b".to_string(), json!(2)),
            ("c".to_string(), json!(3)),
        ]));
        assert_eq!(state.version(), v0 + 2);

        assert!(state.delete("a"));
        assert_eq!(state.version(), v0 + 3);

        state.set_metadata("note", json!("checkpointed"));
        assert_eq!(state.version(), v0 + 4);
    }

    #[test]
    fn test_updated_at_advances() {
        let mut state = WorkflowState::new("g");
        let before = state.updated_at();
        state.set("k", json!(true));
        assert!(state.updated_at() >= before);
        assert!(state.updated_at() >= state.created_at());
    }

    #[test]
    fn test_delete_missing_key_is_not_a_mutation() {
        let mut state = WorkflowState::new("g");
        let v = state.version();
        assert!(!state.delete("never-set"));
        assert_eq!(state.version(), v);
    }

    #[test]
    fn test_set_multiple_empty_is_a_noop() {
        let mut state = WorkflowState::new("g");
        let v = state.version();
        state.set_multiple(HashMap::new());
        assert_eq!(state.version(), v);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut state = WorkflowState::new("g");
        state.set("nested", json!({"prices": [100, 200], "meta": {"currency": "EUR"}}));

        let mut cloned = state.clone();
        assert_eq!(cloned.get("nested"), state.get("nested"));

        // Mutating the clone's nested structure must not leak into the original
        cloned.set("nested", json!({"prices": [999]}));
        assert_eq!(
            state.get("nested"),
            Some(&json!({"prices": [100, 200], "meta": {"currency": "EUR"}}))
        );

        // And the other way around
        state.delete("nested");
        assert_eq!(cloned.get("nested"), Some(&json!({"prices": [999]})));
    }

    #[test]
    fn test_metadata_is_separate_from_payload() {
        let mut state = WorkflowState::new("g");
        state.set_metadata("llm_call:draft", json!({"model": "gpt-4o"}));

        assert!(state.get("llm_call:draft").is_none());
        assert_eq!(
            state.get_metadata("llm_call:draft"),
            Some(&json!({"model": "gpt-4o"}))
        );
    }

    #[test]
    fn test_wire_format_round_trip() {
        let mut state = WorkflowState::new("graph-7").with_user_id("u-1");
        state.set("query", json!("beach holiday"));
        state.set("scores", json!([0.3, 0.9]));
        state.set_metadata("trace", json!({"hops": 2}));

        let doc = state.to_json().unwrap();
        assert_eq!(doc["graph_id"], "graph-7");
        assert_eq!(doc["user_id"], "u-1");
        assert!(doc.get("session_id").is_none());
        assert_eq!(doc["data"]["query"], "beach holiday");

        let restored = WorkflowState::from_json(doc).unwrap();
        assert_eq!(restored.id(), state.id());
        assert_eq!(restored.version(), state.version());
        assert_eq!(restored.get("scores"), Some(&json!([0.3, 0.9])));
        assert_eq!(restored.get_metadata("trace"), Some(&json!({"hops": 2})));
    }
}
