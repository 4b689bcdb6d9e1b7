// SPDX-License-Identifier: MIT

//! Text-generation collaborator boundary
//!
//! The engine never talks to a provider's wire protocol directly. LLM nodes
//! hand a fully rendered [`GenerationRequest`] to a [`TextGenerator`] and
//! store whatever completion text comes back. Provider implementations
//! (HTTP clients, local models, test mocks) live behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlowError;

/// A single generation request handed to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Fully rendered prompt text
    pub prompt: String,
    /// Provider-specific model identifier
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Tool specifications the provider may surface to the model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: 1024,
            temperature: 0.7,
            tools: Vec::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

/// Declarative description of a tool exposed to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's input parameters
    pub parameters: Value,
}

/// Core trait for text-generation providers.
///
/// A failed call is reported as [`FlowError::ExternalCall`] and aborts the
/// run; the engine performs no retries on the provider's behalf.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name used in audit metadata ("openai", "anthropic", ...)
    fn provider(&self) -> &str;

    /// Produce a completion for the request
    async fn generate(&self, request: &GenerationRequest) -> Result<String, FlowError>;
}
