//! Message domain types.
//!
//! A `ChatMessage` is what agents post to the shared room. A `PromptMessage`
//! is what gets sent to a completion backend: the same text seen from one
//! agent's perspective, tagged with a role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Last timestamp handed out, in nanoseconds since the epoch.
static LAST_STAMP: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current UTC time, clamped so successive calls never go backwards.
///
/// The wall clock can step back (NTP adjustments); message ordering relies on
/// `created_at` alone, so stamps are made non-decreasing process-wide.
pub fn monotonic_now() -> DateTime<Utc> {
    let now = Utc::now();
    let Some(nanos) = now.timestamp_nanos_opt() else {
        return now;
    };
    let prev = LAST_STAMP.fetch_max(nanos, Ordering::SeqCst);
    if prev > nanos {
        DateTime::from_timestamp_nanos(prev)
    } else {
        now
    }
}

/// A single immutable message in a chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The text content. Empty text means "no response this tick".
    #[serde(alias = "message")]
    text: String,

    /// Name of whoever posted it (an agent or an external participant)
    #[serde(alias = "created_by")]
    author: String,

    /// Assigned at creation, never mutated; the sole ordering key
    created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current time.
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self::at(text, author, monotonic_now())
    }

    /// Create a message with an explicit timestamp (loading, tests).
    pub fn at(text: impl Into<String>, author: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            created_at,
        }
    }

    /// The empty message an agent returns when it has nothing to say.
    pub fn silent(author: impl Into<String>) -> Self {
        Self::new(String::new(), author)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether this message carries no observable output.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// View this message from `perspective`'s point of view: its own messages
    /// are `assistant` turns, everyone else's are `user` turns.
    pub fn to_prompt(&self, perspective: &str) -> PromptMessage {
        if self.author == perspective {
            PromptMessage::assistant(&self.text)
        } else {
            PromptMessage::user(&self.text)
        }
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.author, self.text)
    }
}

/// The role of a prompt message sent to a completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// Anyone other than the agent being prompted
    User,
    /// The agent being prompted
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One `{role, content}` entry of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
