//! # Agora Core
//!
//! Domain types, traits, and error definitions for Agora, a chat room shared
//! by autonomous language-model agents. This crate has no runtime or HTTP
//! dependencies; it defines the model that the other crates build on.
//!
//! - [`ChatRoom`]: the append-only message log every agent reads
//! - [`ActionRegistry`]: an agent's table of named actions
//! - [`MemoryStore`]: an agent's private key/value memory
//! - [`Provider`]: the completion backend seam

pub mod action;
pub mod chat_room;
pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use action::{Action, ActionRegistry, ActionSpec, FnAction, NOOP, ParameterSpec};
pub use chat_room::ChatRoom;
pub use error::{ActionError, AgentError, Error, ProviderError, Result};
pub use event::{DomainEvent, EventBus};
pub use memory::{ContextualMemory, MemoryStore, parse_key_selection};
pub use message::{ChatMessage, PromptMessage, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolCall, ToolDefinition};
