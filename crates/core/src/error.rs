//! Error types for the Agora domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; `Error` is the umbrella.

use std::time::Duration;
use thiserror::Error;

/// The top-level error type for all Agora operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Action errors ---
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    // --- Agent cycle errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document error: {0}")]
    Document(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the completion backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures while looking up or running an entry of an action registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid arguments for {action}: {reason}")]
    InvalidArguments { action: String, reason: String },

    #[error("Action {action} failed: {reason}")]
    ExecutionFailed { action: String, reason: String },
}

/// A failure that aborts one agent's cycle for the current tick.
///
/// Never fatal to the tick itself: the scheduler records it and moves on.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Agent {agent} timed out after {after:?}")]
    TimedOut { agent: String, after: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn unknown_action_surfaces_through_agent_error() {
        let err: AgentError = ActionError::UnknownAction("dance".into()).into();
        assert_eq!(err.to_string(), "Unknown action: dance");
        assert!(matches!(
            err,
            AgentError::Action(ActionError::UnknownAction(ref name)) if name == "dance"
        ));
    }

    #[test]
    fn timeout_names_the_agent() {
        let err = AgentError::TimedOut {
            agent: "alice".into(),
            after: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("alice"));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn sub_second_timeout_keeps_its_precision() {
        let err = AgentError::TimedOut {
            agent: "alice".into(),
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Agent alice timed out after 250ms");
    }
}
