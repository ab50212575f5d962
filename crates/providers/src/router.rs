//! Provider router: maps an agent's model reference to a backend.
//!
//! A model reference is either a bare model id (`"openai/gpt-4o-mini"`, sent
//! to the default provider untouched) or `"<provider>:<model>"`. When the
//! prefix names a registered provider (`"ollama:llama3"`) the request goes
//! there; otherwise it is a hub pair (`"openai:gpt-4o-mini"`) and the default
//! provider gets `"<provider>/<model>"`.

use std::collections::HashMap;
use std::sync::Arc;
use agora_core::provider::Provider;
use tracing::debug;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Resolve a model reference to a provider and the model id to send it.
    pub fn resolve(&self, model_reference: &str) -> Option<(Arc<dyn Provider>, String)> {
        let Some((prefix, model)) = model_reference.split_once(':') else {
            return self.default().map(|p| (p, model_reference.to_string()));
        };

        if let Some(provider) = self.get(prefix) {
            debug!(provider = prefix, model, "Resolved prefixed model reference");
            return Some((provider, model.to_string()));
        }

        // A colon after the vendor path is a variant tag ("vendor/model:free")
        if prefix.contains('/') || prefix.is_empty() {
            return self.default().map(|p| (p, model_reference.to_string()));
        }

        let model = format!("{prefix}/{model}");
        debug!(%model, "Rewrote hub pair for the default provider");
        self.default().map(|p| (p, model))
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &agora_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key)),
        );
    }

    // The default provider always exists, even if not explicitly configured
    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::new(
                &config.default_provider,
                &base_url,
                &api_key,
            )),
        );
    }

    router
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
