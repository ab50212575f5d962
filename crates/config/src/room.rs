//! Room files: which agents take part and how the conversation starts.
//!
//! ```yaml
//! name: Agorama
//! agents:
//!   - name: alice
//!     model_reference: openai/gpt-4o-mini
//!     system_prompt: You are a cheerful poet.
//!     history_window: 10
//!   - name: bob
//!     model_reference: openai/gpt-4o-mini
//!     kind: reasoning
//! initial_state:
//!   - text: Hello everyone!
//!     author: User
//! ```

use crate::ConfigError;
use agora_core::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Which cognition loop an agent runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Reads the recent window and always responds
    #[default]
    Chat,
    /// A chat agent that first asks itself whether to respond
    Reasoning,
    /// Keeps a key/value memory and picks store/remove/respond/noop each cycle
    Memory,
}

/// One agent entry of a room file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique within the room
    pub name: String,

    /// Opaque handle to a completion backend, e.g. `openai/gpt-4o-mini`
    #[serde(alias = "model_hub_pair")]
    pub model_reference: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// How many trailing messages feed the decision step (≥ 1)
    #[serde(default = "default_history_window", alias = "chat_history_length")]
    pub history_window: usize,

    #[serde(default)]
    pub kind: AgentKind,

    /// Run the response gate before deciding. Defaults to true for
    /// `reasoning` agents and false otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gated: Option<bool>,
}

fn default_history_window() -> usize {
    10
}

impl AgentSpec {
    /// A plain chat agent with default settings.
    pub fn new(name: impl Into<String>, model_reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_reference: model_reference.into(),
            system_prompt: None,
            history_window: default_history_window(),
            kind: AgentKind::default(),
            gated: None,
        }
    }

    pub fn is_gated(&self) -> bool {
        self.gated.unwrap_or(self.kind == AgentKind::Reasoning)
    }
}

/// A message seeded into the room before the first tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialMessage {
    #[serde(alias = "message")]
    pub text: String,

    #[serde(alias = "created_by")]
    pub author: String,

    /// Stamped at load time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl InitialMessage {
    pub fn to_message(&self) -> ChatMessage {
        match self.created_at {
            Some(ts) => ChatMessage::at(&self.text, &self.author, ts),
            None => ChatMessage::new(&self.text, &self.author),
        }
    }
}

/// On-disk shape; `agents` is optional here only so its absence can be
/// reported as a missing field rather than a generic parse error.
#[derive(Debug, Deserialize)]
struct RawRoomConfig {
    #[serde(default = "default_room_name", alias = "room_name")]
    name: String,

    agents: Option<Vec<AgentSpec>>,

    #[serde(default)]
    initial_state: Vec<InitialMessage>,
}

fn default_room_name() -> String {
    "Agorama".into()
}

/// A validated room definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    pub agents: Vec<AgentSpec>,

    #[serde(default)]
    pub initial_state: Vec<InitialMessage>,
}

/// Document syntax of a room file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomFormat {
    Yaml,
    Json,
    Toml,
}

impl RoomFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl RoomConfig {
    /// Read, parse and validate a room file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = RoomFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = Self::parse(&content, format, path)?;
        tracing::info!(
            path = %path.display(),
            agents = config.agents.len(),
            initial_messages = config.initial_state.len(),
            "Loaded room config"
        );
        Ok(config)
    }

    /// Parse and validate a room document. `origin` is only used in errors.
    pub fn parse(content: &str, format: RoomFormat, origin: &Path) -> Result<Self, ConfigError> {
        let parse_err = |reason: String| ConfigError::ParseError {
            path: origin.to_path_buf(),
            reason,
        };

        let raw: RawRoomConfig = match format {
            RoomFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            RoomFormat::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            RoomFormat::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        };

        let agents = raw.agents.ok_or_else(|| ConfigError::MissingField {
            path: origin.to_path_buf(),
            field: "agents",
        })?;

        let config = Self {
            name: raw.name,
            agents,
            initial_state: raw.initial_state,
        };
        config.validate().map_err(|e| match e {
            ConfigError::ValidationError(reason) => {
                ConfigError::ValidationError(format!("{}: {reason}", origin.display()))
            }
            other => other,
        })?;
        Ok(config)
    }

    /// Check agent entries: non-empty names and model references, unique
    /// names, and a history window of at least one message.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (i, agent) in self.agents.iter().enumerate() {
            if agent.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "agents[{i}]: name must not be empty"
                )));
            }
            if agent.model_reference.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}': model_reference must not be empty",
                    agent.name
                )));
            }
            if agent.history_window == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}': history_window must be at least 1",
                    agent.name
                )));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate agent name '{}'",
                    agent.name
                )));
            }
        }
        Ok(())
    }

    /// The seed messages, in file order.
    pub fn initial_messages(&self) -> Vec<ChatMessage> {
        self.initial_state.iter().map(InitialMessage::to_message).collect()
    }

    /// A small three-agent room, used by `agora init`.
    pub fn sample() -> Self {
        let mut poet = AgentSpec::new("poet", "openai/gpt-4o-mini");
        poet.system_prompt = Some("You are a poet. Answer in at most two lines.".into());
        let mut critic = AgentSpec::new("critic", "openai/gpt-4o-mini");
        critic.kind = AgentKind::Reasoning;
        critic.system_prompt = Some("You are a terse literary critic.".into());
        let mut archivist = AgentSpec::new("archivist", "openai/gpt-4o-mini");
        archivist.kind = AgentKind::Memory;

        Self {
            name: default_room_name(),
            agents: vec![poet, critic, archivist],
            initial_state: vec![InitialMessage {
                text: "Write something about the sea.".into(),
                author: "User".into(),
                created_at: None,
            }],
        }
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
