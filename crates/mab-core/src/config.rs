//! Configuration System
//!
//! Loads experiment parameters from a TOML file so runs can be set up
//! without recompiling. Every section falls back to the reference
//! experiment: 50 agents on a small-world network, two regimes switching at
//! round 20.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::agent::MemoryRule;
use crate::bandit::RewardDistribution;
use crate::error::ConfigurationError;
use crate::setup;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "experiment.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub simulation: SimulationConfig,
    pub agents: AgentConfig,
    pub network: NetworkConfig,
    pub regimes: Vec<RegimeConfig>,
}

/// Run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub experiment_id: u64,
    pub rounds: u64,
    pub seed: u64,
    /// Fan phases out over the rayon pool
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            experiment_id: 0,
            rounds: 40,
            seed: 42,
            parallel: true,
        }
    }
}

/// Population parameters. Every agent shares the same decision rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub count: usize,
    /// Probability of the softmax branch; imitation otherwise
    pub softmax_prob: f64,
    pub memory: MemoryRule,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            count: 50,
            softmax_prob: 0.1,
            memory: MemoryRule::default(),
        }
    }
}

/// Social network topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    #[default]
    WattsStrogatz,
    RingLattice,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub kind: NetworkKind,
    /// Neighbors per node in the underlying ring (even)
    pub degree: usize,
    /// Watts-Strogatz rewiring probability
    pub rewiring_prob: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            kind: NetworkKind::WattsStrogatz,
            degree: 4,
            rewiring_prob: 0.1,
        }
    }
}

/// One regime. Option ids are the positions in `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub start_round: u64,
    pub options: Vec<RewardDistribution>,
}

impl RegimeConfig {
    /// Gaussian options with a shared standard deviation.
    pub fn normal(start_round: u64, means: &[f64], std: f64) -> Self {
        Self {
            start_round,
            options: means
                .iter()
                .map(|&mean| RewardDistribution::Normal { mean, std })
                .collect(),
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            agents: AgentConfig::default(),
            network: NetworkConfig::default(),
            regimes: vec![
                RegimeConfig::normal(0, &[1.0, 1.2, 1.4, 1.6], 0.5),
                RegimeConfig::normal(20, &[1.6, 1.5, 1.2, 1.0], 0.5),
            ],
        }
    }
}

impl ExperimentConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from the default path, or uses defaults if not found.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!(
                "Could not load {}: {}. Using defaults.",
                DEFAULT_CONFIG_PATH,
                e
            );
            Self::default()
        })
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every parameter the simulation would reject at construction.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        setup::build_environment(&self.regimes)?;
        setup::validate_agent_config(&self.agents)?;
        setup::network::validate(&self.network, self.agents.count)?;
        Ok(())
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigurationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExperimentConfig::default();
        assert_eq!(config.simulation.rounds, 40);
        assert_eq!(config.agents.count, 50);
        assert_eq!(config.regimes.len(), 2);
        assert_eq!(config.regimes[1].start_round, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = ExperimentConfig::from_str(
            r#"
            [simulation]
            rounds = 10

            [agents]
            count = 8
            softmax_prob = 0.5
            memory = { rule = "window", len = 3 }
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.rounds, 10);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.agents.memory, MemoryRule::Window { len: 3 });
        assert_eq!(config.network, NetworkConfig::default());
        assert_eq!(config.regimes.len(), 2);
    }

    #[test]
    fn test_regimes_from_toml() {
        let config = ExperimentConfig::from_str(
            r#"
            [network]
            kind = "complete"

            [[regimes]]
            start_round = 0
            options = [
                { family = "normal", mean = 1.0, std = 0.5 },
                { family = "constant", value = 5.0 },
            ]

            [[regimes]]
            start_round = 30
            options = [{ family = "normal", mean = 2.0, std = 0.1 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.network.kind, NetworkKind::Complete);
        assert_eq!(config.regimes.len(), 2);
        assert_eq!(
            config.regimes[0].options[1],
            RewardDistribution::Constant { value: 5.0 }
        );
    }

    #[test]
    fn test_invalid_regimes_rejected() {
        let err = ExperimentConfig::from_str(
            r#"
            [[regimes]]
            start_round = 5
            options = [{ family = "normal", mean = 1.0, std = 0.5 }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ConfigurationError::FirstRegimeNotAtZero { found: 5 })
        ));
    }

    #[test]
    fn test_negative_std_rejected() {
        let err = ExperimentConfig::from_str(
            r#"
            [[regimes]]
            start_round = 0
            options = [{ family = "normal", mean = 1.0, std = -1.0 }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ConfigurationError::InvalidRewardParameters { .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = ExperimentConfig::from_str("[simulation\nrounds = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ExperimentConfig::default();
        let toml = config.to_toml().unwrap();
        let parsed = ExperimentConfig::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nseed = 7").unwrap();
        let config = ExperimentConfig::load(file.path()).unwrap();
        assert_eq!(config.simulation.seed, 7);

        let missing = ExperimentConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
