//! Scripted backends for exercising agents without a network.

use std::sync::Mutex;
use agora_core::error::ProviderError;
use agora_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolCall};

/// A provider that replays a fixed sequence of outcomes and records every
/// request it receives.
///
/// Each call to `complete` returns the next scripted outcome. Calls past the
/// end of the script fail with `ProviderError::NotConfigured`.
pub struct ScriptedProvider {
    script: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replay plain text answers.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
            requests.push(request);
            requests.len() - 1
        };

        let script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.get(call).cloned().unwrap_or_else(|| {
            Err(ProviderError::NotConfigured(format!(
                "scripted provider has no answer for call #{call} (have {})",
                script.len()
            )))
        })
    }
}

/// A text-only response.
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse::text(text, "scripted-model")
}

/// A response selecting one tool with the given JSON arguments.
pub fn tool_response(name: &str, arguments: serde_json::Value) -> ProviderResponse {
    ProviderResponse {
        text: String::new(),
        tool_calls: vec![ToolCall {
            id: format!("call_{name}"),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
        usage: None,
        model: "scripted-model".into(),
    }
}
