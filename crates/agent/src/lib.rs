//! Agent cognition for Agora.
//!
//! Every agent runs the same cycle once per tick:
//!
//! 1. **Gate** (optional): ask the backend whether to respond at all
//! 2. **Perceive**: read the trailing window of the room, refresh private state
//! 3. **Decide**: pick an action from the agent's registry
//! 4. **Act**: run it; its result becomes the agent's message for the tick
//!
//! Agent kinds differ only in their [`Policy`] and action table.

pub mod chat;
pub mod cognition;
pub mod gate;
pub mod llm;
pub mod memory_agent;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use chat::{ChatAgent, ChatPolicy, ChatState, chat_agent};
pub use cognition::{Agent, CognitiveAgent, Decision, HistoryRecord, Policy};
pub use gate::ResponseGate;
pub use llm::LlmHandle;
pub use memory_agent::{MemoryAgent, MemoryPolicy, MemoryState, memory_agent};

use agora_config::{AgentKind, AgentSpec};

/// Build the agent an [`AgentSpec`] describes, talking to `llm`.
pub fn build_agent(spec: &AgentSpec, llm: LlmHandle) -> Box<dyn Agent> {
    let gated = spec.is_gated();
    let system_prompt = spec.system_prompt.clone();
    match spec.kind {
        AgentKind::Chat | AgentKind::Reasoning => Box::new(chat_agent(
            &spec.name,
            llm,
            system_prompt,
            spec.history_window,
            gated,
        )),
        AgentKind::Memory => Box::new(memory_agent(
            &spec.name,
            llm,
            system_prompt,
            spec.history_window,
            gated,
        )),
    }
}
