// SPDX-License-Identifier: MIT

//! Named tool capabilities and their registry
//!
//! Tool nodes resolve capabilities by name at execution time; the registry
//! is the single name→capability map shared by every graph that uses tools.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::FlowError;

/// Trait for tools that can be invoked from a workflow.
///
/// `name()`, `description()` and `schema()` return borrows so lookups and
/// spec building never allocate; implementations store these in fields.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (must be unique within a registry)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    /// Execute the tool with the given input bag and return the result
    async fn execute(&self, input: Value) -> Result<Value, FlowError>;
}

/// Concurrent name→tool registry.
///
/// Cloning is shallow; every clone shares the same underlying map.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a tool under its own name, replacing any previous entry
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().await;
        log::debug!("registering tool '{}'", tool.name());
        tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// Names of every registered tool
    pub async fn names(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        tools.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.tools.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tools.read().await.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use serde_json::json;

    static MOCK_SCHEMA: Lazy<Value> = Lazy::new(|| {
        json!({
            "type": "object",
            "properties": {}
        })
    });

    /// A mock tool for testing
    struct MockTool {
        name: String,
        description: String,
    }

    impl MockTool {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                description: format!("Mock tool: {}", name),
            }
        }
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            &self.description
        }

        fn schema(&self) -> &Value {
            &MOCK_SCHEMA
        }

        async fn execute(&self, _input: Value) -> Result<Value, FlowError> {
            Ok(json!({"result": "mock"}))
        }
    }

    #[tokio::test]
    async fn test_register_and_get_tool() {
        let registry = ToolRegistry::new();
        let tool = Arc::new(MockTool::new("flight_search"));

        registry.register(tool).await;

        let retrieved = registry.get("flight_search").await;
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().name(), "flight_search");
    }

    #[tokio::test]
    async fn test_get_nonexistent_tool() {
        let registry = ToolRegistry::new();

        let retrieved = registry.get("nonexistent").await;
        assert!(retrieved.is_none());
    }

    #[tokio::test]
    async fn test_register_overwrites_existing() {
        let registry = ToolRegistry::new();

        registry.register(Arc::new(MockTool::new("same_name"))).await;
        registry.register(Arc::new(MockTool::new("same_name"))).await;

        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_names_lists_registered_tools() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty().await);

        registry.register(Arc::new(MockTool::new("tool1"))).await;
        registry.register(Arc::new(MockTool::new("tool2"))).await;

        let mut names = registry.names().await;
        names.sort();
        assert_eq!(names, vec!["tool1", "tool2"]);
    }

    #[tokio::test]
    async fn test_registry_is_clone() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("tool1"))).await;

        let cloned = registry.clone();

        assert!(cloned.get("tool1").await.is_some());

        // Registering on clone should be visible to original
        cloned.register(Arc::new(MockTool::new("tool2"))).await;
        assert!(registry.get("tool2").await.is_some());
    }
}
