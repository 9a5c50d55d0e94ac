//! Experiment Setup
//!
//! Turns an [`ExperimentConfig`] into an environment, a population and a
//! social network, then assembles the [`Simulation`].

pub mod network;

use mab_events::AgentId;
use tracing::info;

use crate::agent::{Agent, VoterModelAgent};
use crate::bandit::{Environment, Regime};
use crate::config::{AgentConfig, ExperimentConfig, RegimeConfig};
use crate::engine::Simulation;
use crate::error::ConfigurationError;

/// Builds the regime-switching environment. Option ids are positional.
pub fn build_environment(regimes: &[RegimeConfig]) -> Result<Environment, ConfigurationError> {
    let regimes = regimes
        .iter()
        .map(|regime| Regime::from_distributions(regime.start_round, &regime.options))
        .collect::<Result<Vec<_>, _>>()?;
    Environment::new(regimes)
}

/// Checks population parameters without building agents.
pub fn validate_agent_config(config: &AgentConfig) -> Result<(), ConfigurationError> {
    if config.count == 0 {
        return Err(ConfigurationError::InvalidAgentParameter {
            name: "count",
            value: 0.0,
            reason: "population must not be empty",
        });
    }
    VoterModelAgent::new(AgentId(0), config.softmax_prob, config.memory)?;
    Ok(())
}

/// Builds `config.count` voter-model agents with ids `0..count`.
pub fn build_agents(config: &AgentConfig) -> Result<Vec<Box<dyn Agent>>, ConfigurationError> {
    validate_agent_config(config)?;
    (0..config.count as u32)
        .map(|id| {
            VoterModelAgent::new(AgentId(id), config.softmax_prob, config.memory)
                .map(|agent| Box::new(agent) as Box<dyn Agent>)
        })
        .collect()
}

/// Assembles a ready-to-run simulation from configuration.
pub fn build_simulation(config: &ExperimentConfig) -> Result<Simulation, ConfigurationError> {
    let environment = build_environment(&config.regimes)?;
    let agents = build_agents(&config.agents)?;
    let graph = network::build(&config.network, config.agents.count, config.simulation.seed)?;

    info!(
        "Built experiment {}: {} agents, {} edges, {} regimes starting at {:?}",
        config.simulation.experiment_id,
        agents.len(),
        graph.edge_count(),
        environment.regimes().len(),
        environment.start_rounds()
    );
    let isolated = graph.isolated_nodes();
    if !isolated.is_empty() {
        tracing::warn!(
            "{} isolated agents will fail if they take the imitation branch",
            isolated.len()
        );
    }

    Ok(Simulation::new(
        config.simulation.experiment_id,
        agents,
        environment,
        graph,
        config.simulation.seed,
    )?
    .with_parallel(config.simulation.parallel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MemoryRule;

    #[test]
    fn test_build_agents_dense_ids() {
        let agents = build_agents(&AgentConfig {
            count: 5,
            softmax_prob: 0.2,
            memory: MemoryRule::Ewma { decay: 0.9 },
        })
        .unwrap();
        assert_eq!(agents.len(), 5);
        for (i, agent) in agents.iter().enumerate() {
            assert_eq!(agent.id(), AgentId(i as u32));
            assert!(agent.action_history().is_empty());
        }
    }

    #[test]
    fn test_empty_population_rejected() {
        let config = AgentConfig {
            count: 0,
            ..AgentConfig::default()
        };
        assert!(build_agents(&config).is_err());
    }

    #[test]
    fn test_build_default_simulation() {
        let config = ExperimentConfig::default();
        let mut sim = build_simulation(&config).unwrap();
        assert_eq!(sim.agents().len(), 50);
        assert_eq!(sim.environment().start_rounds(), vec![0, 20]);
        sim.run(config.simulation.rounds).unwrap();
        assert_eq!(sim.round_num(), 40);
    }
}
