//! LLM provider implementations for Agora.
//!
//! All providers implement the `agora_core::Provider` trait.
//! The router maps each agent's model reference to a backend.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
