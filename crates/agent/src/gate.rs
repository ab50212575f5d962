//! The response gate: "should I say anything at all this tick?"
//!
//! One completion call per cycle. Only an answer of exactly `yes` (ignoring
//! case and surrounding whitespace) opens the gate; anything else, including
//! a backend failure, keeps the agent quiet.

use agora_core::message::{ChatMessage, PromptMessage};
use tracing::{debug, warn};
use crate::llm::LlmHandle;

pub struct ResponseGate {
    llm: LlmHandle,
}

impl ResponseGate {
    pub fn new(llm: LlmHandle) -> Self {
        Self { llm }
    }

    /// The yes/no question put to the backend.
    pub fn prompt(window: &[ChatMessage]) -> String {
        let context = window
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        format!("Given the following conversation: {context}, should I respond? (yes/no)")
    }

    /// Never fails: errors resolve to `false`.
    pub async fn should_respond(&self, agent: &str, window: &[ChatMessage]) -> bool {
        let prompt = Self::prompt(window);
        match self.llm.chat(vec![PromptMessage::user(prompt)]).await {
            Ok(answer) => {
                let open = parse_answer(&answer);
                debug!(agent, answer = %answer.trim(), open, "Response gate evaluated");
                open
            }
            Err(e) => {
                warn!(agent, error = %e, "Response gate call failed, staying silent");
                false
            }
        }
    }
}

impl std::fmt::Debug for ResponseGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGate").field("llm", &self.llm).finish()
    }
}

fn parse_answer(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}
