//! What happened to each agent during one tick.

use serde::Serialize;

/// One agent's result for a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AgentOutcome {
    /// Produced a non-empty message, committed to the log
    Responded,
    /// Finished the cycle with nothing to say
    Silent,
    /// The cycle failed; the error is kept for display
    Failed(String),
    /// The cycle exceeded the per-agent timeout
    TimedOut,
}

impl AgentOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::TimedOut)
    }
}

/// Summary of one tick, in agent registration order.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub outcomes: Vec<(String, AgentOutcome)>,
    /// Messages committed to the log this tick
    pub appended: usize,
}

impl TickReport {
    pub fn outcome(&self, agent: &str) -> Option<&AgentOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == agent)
            .map(|(_, outcome)| outcome)
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tick {}: {} appended", self.tick, self.appended)?;
        for (agent, outcome) in &self.outcomes {
            match outcome {
                AgentOutcome::Responded => write!(f, ", {agent} responded")?,
                AgentOutcome::Silent => write!(f, ", {agent} silent")?,
                AgentOutcome::Failed(e) => write!(f, ", {agent} failed ({e})")?,
                AgentOutcome::TimedOut => write!(f, ", {agent} timed out")?,
            }
        }
        Ok(())
    }
}
