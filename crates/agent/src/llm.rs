//! A completion backend bound to one model and its sampling settings.

use std::sync::Arc;
use agora_core::error::ProviderError;
use agora_core::message::PromptMessage;
use agora_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use tracing::debug;

/// What an agent holds to talk to its backend.
#[derive(Clone)]
pub struct LlmHandle {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmHandle {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One completion call, optionally offering tools.
    pub async fn complete(
        &self,
        messages: Vec<PromptMessage>,
        tools: Vec<ToolDefinition>,
    ) -> Result<ProviderResponse, ProviderError> {
        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "Calling completion backend"
        );

        let mut request = ProviderRequest::new(&self.model, messages).with_tools(tools);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        self.provider.complete(request).await
    }

    /// A plain text completion.
    pub async fn chat(&self, messages: Vec<PromptMessage>) -> Result<String, ProviderError> {
        Ok(self.complete(messages, Vec::new()).await?.text)
    }
}

impl std::fmt::Debug for LlmHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmHandle")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    #[tokio::test]
    async fn request_carries_model_and_sampling() {
        let provider = Arc::new(ScriptedProvider::texts(&["ok"]));
        let llm = LlmHandle::new(provider.clone(), "gpt-4o-mini").with_sampling(0.2, Some(64));

        let text = llm.chat(vec![PromptMessage::user("hi")]).await.unwrap();
        assert_eq!(text, "ok");

        let request = &provider.requests()[0];
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, Some(64));
        assert!(request.tools.is_empty());
    }
}
