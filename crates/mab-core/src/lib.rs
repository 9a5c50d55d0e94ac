//! Social bandit experiment engine.
//!
//! A population of agents on a static social network repeatedly picks among
//! reward-generating options whose distributions switch in discrete regimes.
//! Each round every agent either exploits its own value estimates through a
//! softmax or imitates a neighbor's previous action.
//!
//! # Modules
//!
//! - [`bandit`]: reward sources, regimes, the regime-switching environment
//! - [`agent`]: the two-phase agent contract and the voter-model agent
//! - [`graph`]: the social graph capability
//! - [`engine`]: round orchestration and export views
//! - [`config`], [`setup`]: TOML configuration and experiment assembly
//! - [`output`]: table serialization

pub mod agent;
pub mod bandit;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod output;
pub mod setup;

pub use agent::{
    ActionSnapshot, Agent, CommitOutcome, DecideContext, MemoryRule, ValueMemory,
    VoterModelAgent, NEUTRAL_PRIOR,
};
pub use bandit::{Environment, Regime, RewardDistribution, RewardSource};
pub use config::{ConfigError, ExperimentConfig};
pub use engine::{run_experiment, Simulation};
pub use error::{ConfigurationError, EngineError, EngineResult};
pub use graph::{AdjacencyGraph, SocialGraph};
pub use output::{write_record, ExportFormat, OutputError};

pub use mab_events::{AgentId, OptionId};
