//! The tick scheduler: one shared log, many agents, strictly sequential ticks.
//!
//! Each tick fans out to every agent concurrently against the log as it was
//! when the tick began, waits for all of them, then commits the non-empty
//! messages in one batch ordered by `created_at` (ties keep registration
//! order). A failing or slow agent costs only its own contribution.

pub mod report;

pub use report::{AgentOutcome, TickReport};

use std::time::Duration;
use chrono::Utc;
use futures::future::join_all;
use agora_agent::{Agent, LlmHandle, build_agent};
use agora_config::{AppConfig, RoomConfig};
use agora_core::chat_room::ChatRoom;
use agora_core::error::{AgentError, Error, Result};
use agora_core::event::{DomainEvent, EventBus};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// A room: the shared log plus the agents taking part.
pub struct Agorama {
    log: ChatRoom,
    agents: Vec<Box<dyn Agent>>,
    events: EventBus,
    agent_timeout: Option<Duration>,
    tick_delay: Duration,
    ticks: u64,
}

impl Agorama {
    /// An empty room with no pacing and no per-agent timeout.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_log(ChatRoom::new(name))
    }

    /// A room continuing an existing log.
    pub fn with_log(log: ChatRoom) -> Self {
        Self {
            log,
            agents: Vec::new(),
            events: EventBus::default(),
            agent_timeout: None,
            tick_delay: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Assemble a room from its configuration. Nothing is built if any agent
    /// cannot be.
    pub fn from_config(room: &RoomConfig, app: &AppConfig) -> Result<Self> {
        room.validate()?;

        let router = agora_providers::build_from_config(app);
        let mut agents = Vec::with_capacity(room.agents.len());
        for spec in &room.agents {
            let (provider, model) = router.resolve(&spec.model_reference).ok_or_else(|| {
                Error::Config {
                    message: format!(
                        "agent '{}': no provider for model reference '{}'",
                        spec.name, spec.model_reference
                    ),
                }
            })?;
            let llm = LlmHandle::new(provider, model)
                .with_sampling(app.default_temperature, Some(app.default_max_tokens));
            agents.push(build_agent(spec, llm));
        }

        let mut log = ChatRoom::new(&room.name);
        for message in room.initial_messages() {
            log.append(message);
        }

        let mut agorama = Self::with_log(log)
            .with_tick_delay(app.runtime.tick_delay())
            .with_agent_timeout(app.runtime.agent_timeout());
        for agent in agents {
            agorama.add_agent(agent)?;
        }

        info!(
            room = %room.name,
            agents = agorama.agents.len(),
            messages = agorama.log.len(),
            "Room assembled"
        );
        Ok(agorama)
    }

    pub fn with_tick_delay(mut self, delay: Duration) -> Self {
        self.tick_delay = delay;
        self
    }

    /// `None` waits for every agent however long it takes.
    pub fn with_agent_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Register an agent. Names must be unique within the room.
    pub fn add_agent(&mut self, agent: Box<dyn Agent>) -> Result<()> {
        if self.agents.iter().any(|a| a.name() == agent.name()) {
            return Err(Error::Config {
                message: format!("duplicate agent name '{}'", agent.name()),
            });
        }
        debug!(agent = agent.name(), "Agent joined");
        self.agents.push(agent);
        Ok(())
    }

    pub fn log(&self) -> &ChatRoom {
        &self.log
    }

    pub fn into_log(self) -> ChatRoom {
        self.log
    }

    /// Agent names in registration order.
    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn subscribe(&self) -> broadcast::Receiver<std::sync::Arc<DomainEvent>> {
        self.events.subscribe()
    }

    /// Run one tick: fan out, wait for everyone, commit.
    pub async fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let tick = self.ticks;
        let started = std::time::Instant::now();
        self.events.publish(DomainEvent::TickStarted {
            tick,
            agents: self.agents.len(),
            timestamp: Utc::now(),
        });

        let log = &self.log;
        let timeout = self.agent_timeout;
        let cycles = self.agents.iter_mut().map(|agent| async move {
            let name = agent.name().to_string();
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, agent.act(log))
                    .await
                    .unwrap_or_else(|_| {
                        Err(AgentError::TimedOut {
                            agent: name.clone(),
                            after: limit,
                        })
                    }),
                None => agent.act(log).await,
            };
            (name, result)
        });
        let results = join_all(cycles).await;

        let mut batch = Vec::with_capacity(results.len());
        let mut outcomes = Vec::with_capacity(results.len());
        for (agent, result) in results {
            let outcome = match result {
                Ok(message) if message.is_empty() => {
                    debug!(tick, agent = %agent, "Agent stayed silent");
                    self.events.publish(DomainEvent::AgentSilent {
                        tick,
                        agent: agent.clone(),
                        timestamp: Utc::now(),
                    });
                    AgentOutcome::Silent
                }
                Ok(message) => {
                    self.events.publish(DomainEvent::AgentResponded {
                        tick,
                        agent: agent.clone(),
                        chars: message.text().chars().count(),
                        timestamp: Utc::now(),
                    });
                    batch.push(message);
                    AgentOutcome::Responded
                }
                Err(e) => {
                    warn!(tick, agent = %agent, error = %e, "Agent cycle failed, skipping its contribution");
                    self.events.publish(DomainEvent::AgentFailed {
                        tick,
                        agent: agent.clone(),
                        error_message: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    match e {
                        AgentError::TimedOut { .. } => AgentOutcome::TimedOut,
                        other => AgentOutcome::Failed(other.to_string()),
                    }
                }
            };
            outcomes.push((agent, outcome));
        }

        let appended = batch.len();
        self.log.append_batch(batch);
        self.events.publish(DomainEvent::TickCommitted {
            tick,
            appended,
            log_len: self.log.len(),
            timestamp: Utc::now(),
        });
        info!(
            tick,
            appended,
            log_len = self.log.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Tick committed"
        );

        TickReport {
            tick,
            outcomes,
            appended,
        }
    }

    /// Run `ticks` ticks back to back, pausing `tick_delay` between them.
    pub async fn run(&mut self, ticks: usize) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(ticks);
        for i in 0..ticks {
            if i > 0 && !self.tick_delay.is_zero() {
                tokio::time::sleep(self.tick_delay).await;
            }
            reports.push(self.tick().await);
        }
        reports
    }
}

impl std::fmt::Debug for Agorama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agorama")
            .field("room", &self.log.name())
            .field("messages", &self.log.len())
            .field("agents", &self.agent_names())
            .field("ticks", &self.ticks)
            .field("tick_delay", &self.tick_delay)
            .field("agent_timeout", &self.agent_timeout)
            .finish()
    }
}
