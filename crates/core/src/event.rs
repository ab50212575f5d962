//! Domain events published while a room runs.
//!
//! The scheduler owns one `EventBus`, created with the room and dropped with
//! it. Anything that wants to observe ticks (a UI, a test, an exporter)
//! subscribes instead of scraping logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A tick began fanning out to agents
    TickStarted {
        tick: u64,
        agents: usize,
        timestamp: DateTime<Utc>,
    },

    /// An agent produced a non-empty message
    AgentResponded {
        tick: u64,
        agent: String,
        chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// An agent finished its cycle with nothing to say
    AgentSilent {
        tick: u64,
        agent: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent's cycle failed or timed out; the tick carried on without it
    AgentFailed {
        tick: u64,
        agent: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// The tick's messages were appended to the log
    TickCommitted {
        tick: u64,
        appended: usize,
        log_len: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
