//! Chat agents: read the recent conversation and reply to it.
//!
//! A plain chat agent replies every tick. A reasoning agent is the same agent
//! with a [`ResponseGate`] in front, so it only replies when it judges that
//! it has something to add.

use async_trait::async_trait;
use serde::Serialize;
use agora_core::action::{Action, ActionRegistry, ActionSpec};
use agora_core::error::{ActionError, AgentError};
use agora_core::message::{ChatMessage, PromptMessage};
use crate::cognition::{CognitiveAgent, Decision, Policy};
use crate::gate::ResponseGate;
use crate::llm::LlmHandle;

/// Name of the reply action.
pub const RESPOND: &str = "respond";

/// Private state of a chat agent.
#[derive(Debug, Serialize)]
pub struct ChatState {
    pub agent: String,
    pub system_prompt: Option<String>,

    /// The trailing window of the log seen in the last perceive step
    pub chat_window: Vec<ChatMessage>,

    #[serde(skip)]
    pub llm: LlmHandle,
}

impl ChatState {
    /// System prompt (if any) followed by the window, seen from this agent.
    pub fn prompt(&self) -> Vec<PromptMessage> {
        self.system_prompt
            .iter()
            .map(|p| PromptMessage::system(p.as_str()))
            .chain(self.chat_window.iter().map(|m| m.to_prompt(&self.agent)))
            .collect()
    }
}

/// Always replies.
#[derive(Debug, Default)]
pub struct ChatPolicy;

#[async_trait]
impl Policy<ChatState> for ChatPolicy {
    async fn perceive(&self, window: &[ChatMessage], state: &mut ChatState) -> Vec<String> {
        state.chat_window = window.to_vec();
        vec!["chat_window".into()]
    }

    async fn decide(
        &self,
        _state: &ChatState,
        _actions: &ActionRegistry<ChatState>,
    ) -> Result<Decision, AgentError> {
        Ok(Decision::new(RESPOND))
    }
}

/// One completion over the chat window; the reply is the action result.
pub struct Respond;

#[async_trait]
impl Action<ChatState> for Respond {
    async fn invoke(
        &self,
        state: &mut ChatState,
        _payload: &serde_json::Value,
    ) -> Result<String, ActionError> {
        state
            .llm
            .chat(state.prompt())
            .await
            .map_err(|e| ActionError::ExecutionFailed {
                action: RESPOND.into(),
                reason: e.to_string(),
            })
    }
}

pub type ChatAgent = CognitiveAgent<ChatState, ChatPolicy>;

/// Build a chat agent. Pass `gated = true` for a reasoning agent.
pub fn chat_agent(
    name: impl Into<String>,
    llm: LlmHandle,
    system_prompt: Option<String>,
    history_window: usize,
    gated: bool,
) -> ChatAgent {
    let name = name.into();

    let mut actions = ActionRegistry::new();
    actions.register(
        ActionSpec::new(RESPOND, "Send a message to the room"),
        Respond,
    );

    let state = ChatState {
        agent: name.clone(),
        system_prompt,
        chat_window: Vec::new(),
        llm: llm.clone(),
    };

    let agent = CognitiveAgent::new(name, history_window, state, ChatPolicy, actions);
    if gated {
        agent.with_gate(ResponseGate::new(llm))
    } else {
        agent
    }
}
