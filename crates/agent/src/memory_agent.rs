//! Memory agents: keep a private key/value memory and choose, each tick,
//! whether to store, remove, reply or stay quiet.
//!
//! Perceive asks the backend which remembered keys matter for the current
//! conversation and narrows the memory to that contextual subset. Decide
//! offers the action table as tools and stages the selected tool's arguments.
//! Only `respond` produces a visible message; `store` and `remove` results
//! stay in the agent's history.

use async_trait::async_trait;
use serde::Serialize;
use agora_core::action::{Action, ActionRegistry, ActionSpec};
use agora_core::error::{ActionError, AgentError};
use agora_core::memory::{ContextualMemory, MemoryStore, parse_key_selection};
use agora_core::message::{ChatMessage, PromptMessage};
use tracing::{debug, warn};
use crate::chat::RESPOND;
use crate::cognition::{CognitiveAgent, Decision, Policy};
use crate::gate::ResponseGate;
use crate::llm::LlmHandle;

pub const STORE: &str = "store";
pub const REMOVE: &str = "remove";

const BASE_PROMPT: &str = "You are a helpful AI assistant with memory capabilities. You can:
1. Store important information in your memory bank
2. Retrieve relevant information from memory when needed
3. Remove outdated or incorrect information
4. Respond to user queries using both current context and memory";

const MEMORY_PROMPT: &str = "Return a list of keys from {memory_keys} that are relevant to the conversation.
If there are no relevant keys, return an empty list. Answer with JSON of the form {\"key_list\": [...]}.";

const DECISION_PROMPT: &str = "Based on the current conversation and memory state, what action should you take?
Available actions:
1. `store` - Store new information in memory
2. `remove` - Remove information from memory
3. `respond` - Send a message to the user
4. `noop` - Do nothing";

const RESPOND_PROMPT: &str = "Based on the current conversation and memory state, respond to the user.";

/// Private state of a memory agent.
#[derive(Debug, Serialize)]
pub struct MemoryState {
    pub agent: String,
    pub system_prompt: Option<String>,
    pub memory: MemoryStore,

    /// Recomputed every perceive step
    pub contextual_memory: ContextualMemory,

    pub chat_window: Vec<ChatMessage>,

    #[serde(skip)]
    pub llm: LlmHandle,
}

impl MemoryState {
    fn new(agent: String, system_prompt: Option<String>, llm: LlmHandle) -> Self {
        Self {
            agent,
            system_prompt,
            memory: MemoryStore::new(),
            contextual_memory: ContextualMemory::default(),
            chat_window: Vec::new(),
            llm,
        }
    }

    /// `preamble`, then the chat window, then `tail`.
    fn prompt(&self, preamble: &[&str], tail: Option<PromptMessage>) -> Vec<PromptMessage> {
        let mut messages: Vec<PromptMessage> = Vec::new();
        messages.push(PromptMessage::system(BASE_PROMPT));
        if let Some(system_prompt) = &self.system_prompt {
            messages.push(PromptMessage::system(system_prompt));
        }
        messages.extend(preamble.iter().map(|p| PromptMessage::system(*p)));
        messages.extend(self.chat_window.iter().map(|m| m.to_prompt(&self.agent)));
        messages.extend(tail);
        messages
    }

    fn memory_block(&self) -> PromptMessage {
        PromptMessage::assistant(self.contextual_memory.render())
    }
}

/// Lets the backend pick among the registered actions.
#[derive(Debug, Default)]
pub struct MemoryPolicy;

impl MemoryPolicy {
    /// Ask which remembered keys are relevant. Falls back to none.
    async fn select_keys(&self, state: &MemoryState) -> Vec<String> {
        let keys = state.memory.keys();
        if keys.is_empty() {
            return Vec::new();
        }

        let key_list = serde_json::to_string(&keys).unwrap_or_default();
        let question = PromptMessage::user(MEMORY_PROMPT.replace("{memory_keys}", &key_list));
        let mut messages = vec![PromptMessage::system(BASE_PROMPT), question];
        messages.extend(state.chat_window.iter().map(|m| m.to_prompt(&state.agent)));

        let answer = match state.llm.chat(messages).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(agent = %state.agent, error = %e, "Memory key selection failed, using empty context");
                return Vec::new();
            }
        };

        parse_key_selection(&answer).unwrap_or_else(|e| {
            warn!(agent = %state.agent, error = %e, "Using empty memory context");
            Vec::new()
        })
    }
}

#[async_trait]
impl Policy<MemoryState> for MemoryPolicy {
    async fn perceive(&self, window: &[ChatMessage], state: &mut MemoryState) -> Vec<String> {
        state.chat_window = window.to_vec();

        let selected = self.select_keys(state).await;
        state.contextual_memory = state.memory.contextual_subset(selected.as_slice());
        debug!(
            agent = %state.agent,
            selected = selected.len(),
            kept = state.contextual_memory.len(),
            "Contextual memory rebuilt"
        );

        std::iter::once("chat_window".to_string())
            .chain(state.contextual_memory.keys().into_iter().map(String::from))
            .collect()
    }

    async fn decide(
        &self,
        state: &MemoryState,
        actions: &ActionRegistry<MemoryState>,
    ) -> Result<Decision, AgentError> {
        let messages = state.prompt(&[DECISION_PROMPT], Some(state.memory_block()));
        let response = state.llm.complete(messages, actions.definitions()).await?;

        let Some(call) = response.selected_tool() else {
            debug!(agent = %state.agent, "No action selected, doing nothing");
            return Ok(Decision::noop());
        };

        let payload = if call.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&call.arguments).map_err(|e| ActionError::InvalidArguments {
                action: call.name.clone(),
                reason: e.to_string(),
            })?
        };

        Ok(Decision::with_payload(&call.name, payload))
    }

    fn message_text(&self, decision: &Decision, action_result: &str) -> String {
        if decision.action == RESPOND {
            action_result.to_string()
        } else {
            String::new()
        }
    }
}

fn string_arg<'a>(
    action: &str,
    payload: &'a serde_json::Value,
    name: &str,
) -> Result<&'a str, ActionError> {
    payload
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ActionError::InvalidArguments {
            action: action.into(),
            reason: format!("'{name}' must be a string"),
        })
}

fn store(state: &mut MemoryState, payload: &serde_json::Value) -> Result<String, ActionError> {
    let key = string_arg(STORE, payload, "key")?;
    let value = string_arg(STORE, payload, "value")?;
    state.memory.store(key, value);
    Ok(format!("Stored '{key}' in memory"))
}

fn remove(state: &mut MemoryState, payload: &serde_json::Value) -> Result<String, ActionError> {
    let key = string_arg(REMOVE, payload, "key")?;
    Ok(match state.memory.remove(key) {
        Some(_) => format!("Removed '{key}' from memory"),
        None => format!("Key '{key}' not found in memory"),
    })
}

/// Reply using the chat window and the contextual memory.
struct RespondWithMemory;

#[async_trait]
impl Action<MemoryState> for RespondWithMemory {
    async fn invoke(
        &self,
        state: &mut MemoryState,
        _payload: &serde_json::Value,
    ) -> Result<String, ActionError> {
        let messages = state.prompt(&[RESPOND_PROMPT], Some(state.memory_block()));
        state
            .llm
            .chat(messages)
            .await
            .map_err(|e| ActionError::ExecutionFailed {
                action: RESPOND.into(),
                reason: e.to_string(),
            })
    }
}

pub type MemoryAgent = CognitiveAgent<MemoryState, MemoryPolicy>;

/// The memory agent's action table.
pub fn memory_actions() -> ActionRegistry<MemoryState> {
    let mut actions = ActionRegistry::new();
    actions.register_fn(
        ActionSpec::new(STORE, "Store important information in memory")
            .param("key", "string", "The key to store the information under", true)
            .param("value", "string", "The information to store", true),
        store,
    );
    actions.register_fn(
        ActionSpec::new(REMOVE, "Remove information from memory")
            .param("key", "string", "The key to remove the information from", true),
        remove,
    );
    actions.register(
        ActionSpec::new(RESPOND, "Send a message to the user"),
        RespondWithMemory,
    );
    actions
}

pub fn memory_agent(
    name: impl Into<String>,
    llm: LlmHandle,
    system_prompt: Option<String>,
    history_window: usize,
    gated: bool,
) -> MemoryAgent {
    let name = name.into();
    let state = MemoryState::new(name.clone(), system_prompt, llm.clone());
    let agent = CognitiveAgent::new(name, history_window, state, MemoryPolicy, memory_actions());
    if gated {
        agent.with_gate(ResponseGate::new(llm))
    } else {
        agent
    }
}
