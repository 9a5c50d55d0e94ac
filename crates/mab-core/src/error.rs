//! Error Types
//!
//! Every error in the engine is a deterministic logic violation; none is
//! retried. Construction problems surface as [`ConfigurationError`], run-time
//! violations as [`EngineError`].

use mab_events::{AgentId, OptionId};
use thiserror::Error;

/// Invalid construction input. Fatal, never recovered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("invalid parameters for {family} reward source on {option}: {reason}")]
    InvalidRewardParameters {
        option: OptionId,
        family: &'static str,
        reason: String,
    },

    #[error("regime starting at round {start_round} has no options")]
    EmptyRegime { start_round: u64 },

    #[error("regime starting at round {start_round} defines {option} more than once")]
    DuplicateOption { start_round: u64, option: OptionId },

    #[error("environment needs at least one regime")]
    NoRegimes,

    #[error("first regime must start at round 0, found {found}")]
    FirstRegimeNotAtZero { found: u64 },

    #[error("regime start rounds must be strictly ascending: {previous} then {next}")]
    UnsortedRegimes { previous: u64, next: u64 },

    #[error("invalid agent parameter {name} = {value}: {reason}")]
    InvalidAgentParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("agent ids must be exactly 0..{expected}, found {found} at position {position}")]
    AgentIdMismatch {
        expected: usize,
        position: usize,
        found: AgentId,
    },

    /// Agent already carries committed rounds or a pending action.
    #[error("{agent} must start with empty histories and no pending action")]
    AgentNotFresh { agent: AgentId },

    #[error("graph has {graph_nodes} nodes but {agents} agents were supplied")]
    GraphSizeMismatch { graph_nodes: usize, agents: usize },

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}

/// Failure while running the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Round precedes the first regime.
    #[error("no regime is active at round {round} (first regime starts at {first_start})")]
    InvalidRound { round: u64, first_start: u64 },

    /// An agent picked an option the active regime does not offer.
    #[error("{option} is not offered at round {round}")]
    UnknownOption { option: OptionId, round: u64 },

    /// Imitation branch on an agent without neighbors.
    #[error("{agent} has no neighbors to imitate")]
    NoNeighbors { agent: AgentId },

    /// Imitation target has never committed an action.
    #[error("{agent} has no committed action to imitate")]
    MissingHistory { agent: AgentId },

    /// Commit without a prior decide; indicates a barrier violation.
    #[error("{agent} has no pending action to commit")]
    NoPendingAction { agent: AgentId },
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = EngineError::NoNeighbors { agent: AgentId(4) };
        assert_eq!(err.to_string(), "agent_4 has no neighbors to imitate");

        let err = EngineError::UnknownOption {
            option: OptionId(3),
            round: 20,
        };
        assert_eq!(err.to_string(), "option_3 is not offered at round 20");
    }

    #[test]
    fn test_configuration_converts() {
        let err: EngineError = ConfigurationError::NoRegimes.into();
        assert!(matches!(err, EngineError::Configuration(ConfigurationError::NoRegimes)));
        assert_eq!(err.to_string(), "environment needs at least one regime");
    }
}
