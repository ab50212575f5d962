//! The perceive → decide → act cycle every agent runs once per tick.
//!
//! A [`CognitiveAgent`] glues three things together:
//!
//! 1. An optional [`ResponseGate`] that can short-circuit the cycle to a no-op
//! 2. A [`Policy`] that decides how to perceive the room and which action to take
//! 3. An [`ActionRegistry`] holding the actions the policy may pick
//!
//! The state `S` is private to the agent. Only its own actions mutate it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use agora_core::action::{ActionRegistry, NOOP};
use agora_core::chat_room::ChatRoom;
use agora_core::error::{ActionError, AgentError};
use agora_core::message::ChatMessage;
use tracing::{debug, info, warn};
use crate::gate::ResponseGate;

/// Anything the scheduler can ask for a message once per tick.
#[async_trait]
pub trait Agent: Send {
    fn name(&self) -> &str;

    /// Run one full cycle against the log as it is now.
    ///
    /// An empty-text message means "nothing to say this tick".
    async fn act(&mut self, room: &ChatRoom) -> Result<ChatMessage, AgentError>;
}

/// An action name plus the arguments staged for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Decision {
    /// A decision with no arguments.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            payload: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_payload(action: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            action: action.into(),
            payload,
        }
    }

    pub fn noop() -> Self {
        Self::new(NOOP)
    }
}

/// One completed cycle, kept for inspection. Never read back by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// The agent's state after the action ran
    pub state_snapshot: serde_json::Value,
    pub decision: Decision,
    pub action_result: String,
    pub observed_keys: Vec<String>,
}

/// The agent-kind specific half of the cycle.
#[async_trait]
pub trait Policy<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    /// Update `state` from the trailing window of the log. Returns the state
    /// keys that were read.
    async fn perceive(&self, window: &[ChatMessage], state: &mut S) -> Vec<String>;

    /// Pick the next action.
    async fn decide(&self, state: &S, actions: &ActionRegistry<S>) -> Result<Decision, AgentError>;

    /// Text to post for this cycle, given the action's result.
    fn message_text(&self, _decision: &Decision, action_result: &str) -> String {
        action_result.to_string()
    }
}

/// An agent built from a policy, an action table and private state.
pub struct CognitiveAgent<S, P> {
    name: String,
    history_window: usize,
    state: S,
    policy: P,
    actions: ActionRegistry<S>,
    gate: Option<ResponseGate>,
    history: Vec<HistoryRecord>,
}

impl<S, P> CognitiveAgent<S, P>
where
    S: Serialize + Send + Sync + 'static,
    P: Policy<S>,
{
    pub fn new(
        name: impl Into<String>,
        history_window: usize,
        state: S,
        policy: P,
        actions: ActionRegistry<S>,
    ) -> Self {
        Self {
            name: name.into(),
            history_window: history_window.max(1),
            state,
            policy,
            actions,
            gate: None,
            history: Vec::new(),
        }
    }

    /// Put a response gate in front of the cycle.
    pub fn with_gate(mut self, gate: ResponseGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn is_gated(&self) -> bool {
        self.gate.is_some()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn actions(&self) -> &ActionRegistry<S> {
        &self.actions
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    fn record(&mut self, observed_keys: Vec<String>, decision: Decision, action_result: String) {
        let state_snapshot = serde_json::to_value(&self.state).unwrap_or_else(|e| {
            warn!(agent = %self.name, error = %e, "Could not snapshot agent state");
            serde_json::Value::Null
        });
        self.history.push(HistoryRecord {
            state_snapshot,
            decision,
            action_result,
            observed_keys,
        });
    }
}

#[async_trait]
impl<S, P> Agent for CognitiveAgent<S, P>
where
    S: Serialize + Send + Sync + 'static,
    P: Policy<S>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn act(&mut self, room: &ChatRoom) -> Result<ChatMessage, AgentError> {
        let window = room.window(self.history_window);

        if let Some(gate) = &self.gate {
            if !gate.should_respond(&self.name, window).await {
                info!(agent = %self.name, "Decided not to respond");
                self.record(Vec::new(), Decision::noop(), String::new());
                return Ok(ChatMessage::silent(&self.name));
            }
        }

        let observed_keys = self.policy.perceive(window, &mut self.state).await;
        let decision = self.policy.decide(&self.state, &self.actions).await?;

        if !self.actions.contains(&decision.action) {
            warn!(agent = %self.name, action = %decision.action, "Decided on an unregistered action");
            return Err(ActionError::UnknownAction(decision.action).into());
        }

        debug!(agent = %self.name, action = %decision.action, "Acting");
        let result = self
            .actions
            .invoke(&decision.action, &mut self.state, &decision.payload)
            .await?;

        let text = self.policy.message_text(&decision, &result);
        self.record(observed_keys, decision, result);
        Ok(ChatMessage::new(text, &self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use agora_core::action::ActionSpec;
    use crate::llm::LlmHandle;
    use crate::testing::ScriptedProvider;

    #[derive(Debug, Default, Serialize)]
    struct Tally {
        seen: usize,
        said: Vec<String>,
    }

    /// Decides whatever it was built with.
    struct Fixed(&'static str);

    #[async_trait]
    impl Policy<Tally> for Fixed {
        async fn perceive(&self, window: &[ChatMessage], state: &mut Tally) -> Vec<String> {
            state.seen = window.len();
            vec!["seen".into()]
        }

        async fn decide(&self, _state: &Tally, _actions: &ActionRegistry<Tally>) -> Result<Decision, AgentError> {
            Ok(Decision::new(self.0))
        }
    }

    fn actions() -> ActionRegistry<Tally> {
        let mut actions = ActionRegistry::new();
        actions.register_fn(ActionSpec::new("say", "Say hi"), |state: &mut Tally, _| {
            state.said.push("hi".into());
            Ok("hi".into())
        });
        actions
    }

    fn room_with(n: usize) -> ChatRoom {
        let mut room = ChatRoom::new("test");
        for i in 0..n {
            room.append(ChatMessage::new(format!("m{i}"), "user"));
        }
        room
    }

    #[tokio::test]
    async fn cycle_runs_action_and_records_history() {
        let mut agent = CognitiveAgent::new("alice", 2, Tally::default(), Fixed("say"), actions());
        let message = agent.act(&room_with(5)).await.unwrap();

        assert_eq!(message.text(), "hi");
        assert_eq!(message.author(), "alice");
        assert_eq!(agent.state().seen, 2);

        let record = &agent.history()[0];
        assert_eq!(record.decision.action, "say");
        assert_eq!(record.action_result, "hi");
        assert_eq!(record.observed_keys, vec!["seen"]);
        assert_eq!(record.state_snapshot["said"][0], "hi");
    }

    #[tokio::test]
    async fn unregistered_decision_is_unknown_action() {
        let mut agent = CognitiveAgent::new("alice", 3, Tally::default(), Fixed("dance"), actions());
        let err = agent.act(&room_with(1)).await.unwrap_err();

        assert!(matches!(err, AgentError::Action(ActionError::UnknownAction(ref a)) if a == "dance"));
        assert!(agent.history().is_empty());
        assert!(agent.state().said.is_empty());
    }

    #[tokio::test]
    async fn noop_decision_yields_empty_message() {
        let mut agent = CognitiveAgent::new("alice", 3, Tally::default(), Fixed(NOOP), actions());
        let message = agent.act(&room_with(1)).await.unwrap();
        assert!(message.is_empty());
        assert_eq!(agent.history().len(), 1);
    }

    #[tokio::test]
    async fn closed_gate_skips_the_cycle() {
        let provider = Arc::new(ScriptedProvider::texts(&["no"]));
        let gate = ResponseGate::new(LlmHandle::new(provider.clone(), "m"));
        let mut agent = CognitiveAgent::new("alice", 3, Tally::default(), Fixed("say"), actions())
            .with_gate(gate);

        let message = agent.act(&room_with(2)).await.unwrap();

        assert!(message.is_empty());
        assert_eq!(agent.state().seen, 0);
        assert!(agent.state().said.is_empty());
        assert_eq!(agent.history()[0].decision, Decision::noop());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn open_gate_runs_once_then_acts() {
        let provider = Arc::new(ScriptedProvider::texts(&["yes"]));
        let gate = ResponseGate::new(LlmHandle::new(provider.clone(), "m"));
        let mut agent = CognitiveAgent::new("alice", 3, Tally::default(), Fixed("say"), actions())
            .with_gate(gate);

        let message = agent.act(&room_with(2)).await.unwrap();
        assert_eq!(message.text(), "hi");
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn zero_window_is_clamped() {
        let agent = CognitiveAgent::new("alice", 0, Tally::default(), Fixed("say"), actions());
        assert_eq!(agent.history_window(), 1);
    }
}
