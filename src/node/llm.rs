// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use super::{template, Node, NodeType};
use crate::error::FlowError;
use crate::model::{GenerationRequest, TextGenerator};
use crate::state::WorkflowState;

/// Node that renders a prompt template and calls a text-generation provider.
///
/// The completion text lands under `output_key`; an audit record of the call
/// (provider, model, prompt, response, timestamp) is written to the state's
/// metadata side channel under `llm_call:<id>`.
pub struct LlmNode {
    id: String,
    name: String,
    prompt_template: String,
    output_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    generator: Arc<dyn TextGenerator>,
}

impl LlmNode {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_template: impl Into<String>,
        output_key: impl Into<String>,
        model: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt_template: prompt_template.into(),
            output_key: output_key.into(),
            model: model.into(),
            max_tokens: 1024,
            temperature: 0.7,
            generator,
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
}

#[async_trait]
impl Node for LlmNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> NodeType {
        NodeType::Llm
    }

    fn validate(&self) -> Result<(), FlowError> {
        if self.id.is_empty() {
            return Err(FlowError::validation("llm node id must not be empty"));
        }
        if self.prompt_template.is_empty() {
            return Err(FlowError::validation(format!(
                "llm node '{}' has an empty prompt template",
                self.id
            )));
        }
        if self.output_key.is_empty() {
            return Err(FlowError::validation(format!(
                "llm node '{}' has an empty output key",
                self.id
            )));
        }
        if self.model.is_empty() {
            return Err(FlowError::validation(format!(
                "llm node '{}' has an empty model identifier",
                self.id
            )));
        }
        Ok(())
    }

    async fn execute(&self, state: &WorkflowState) -> Result<WorkflowState, FlowError> {
        let mut next = state.clone();

        let prompt = template::render(&self.prompt_template, &next);
        let request = GenerationRequest::new(prompt.clone(), self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        log::info!(
            "llm node '{}' calling {} model '{}'",
            self.id,
            self.generator.provider(),
            self.model
        );
        let response = self.generator.generate(&request).await?;

        next.set(self.output_key.clone(), json!(response.clone()));
        next.set_metadata(
            format!("llm_call:{}", self.id),
            json!({
                "node_id": self.id,
                "provider": self.generator.provider(),
                "model": self.model,
                "prompt": prompt,
                "response": response,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        );

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        fn provider(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, FlowError> {
            Ok(format!("echo: {}", request.prompt))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        fn provider(&self) -> &str {
            "broken"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, FlowError> {
            Err(FlowError::external_call("broken", "quota exhausted"))
        }
    }

    fn node(generator: Arc<dyn TextGenerator>) -> LlmNode {
        LlmNode::new(
            "draft",
            "Draft itinerary",
            "Suggest a trip to {city}",
            "itinerary",
            "test-model",
            generator,
        )
    }

    #[tokio::test]
    async fn test_renders_prompt_and_stores_output() {
        let node = node(Arc::new(EchoGenerator));
        let mut state = WorkflowState::new("g");
        state.set("city", json!("Kyoto"));

        let out = node.execute(&state).await.unwrap();
        assert_eq!(
            out.get("itinerary"),
            Some(&json!("echo: Suggest a trip to Kyoto"))
        );
        // Input untouched
        assert!(state.get("itinerary").is_none());
    }

    #[tokio::test]
    async fn test_records_audit_metadata() {
        let node = node(Arc::new(EchoGenerator));
        let state = WorkflowState::new("g");

        let out = node.execute(&state).await.unwrap();
        let record = out.get_metadata("llm_call:draft").unwrap();
        assert_eq!(record["node_id"], "draft");
        assert_eq!(record["provider"], "echo");
        assert_eq!(record["model"], "test-model");
        assert!(record["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let node = node(Arc::new(FailingGenerator));
        let state = WorkflowState::new("g");

        let err = node.execute(&state).await.unwrap_err();
        assert!(matches!(err, FlowError::ExternalCall { .. }));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let generator: Arc<dyn TextGenerator> = Arc::new(EchoGenerator);

        assert!(node(generator.clone()).validate().is_ok());

        let missing_template =
            LlmNode::new("draft", "Draft", "", "out", "m", generator.clone());
        assert!(missing_template.validate().is_err());

        let missing_output = LlmNode::new("draft", "Draft", "p", "", "m", generator.clone());
        assert!(missing_output.validate().is_err());

        let missing_model = LlmNode::new("draft", "Draft", "p", "out", "", generator);
        assert!(missing_model.validate().is_err());
    }
}
