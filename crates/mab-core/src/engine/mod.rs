//! Simulation Engine
//!
//! Runs synchronous rounds over the whole population:
//!
//! 1. Freeze every agent's last committed action into an [`ActionSnapshot`].
//! 2. Decide phase for every agent, reading only the snapshot, the graph and
//!    the environment.
//! 3. Stage every commit (resolve rewards) without mutating any agent.
//! 4. Apply every commit, then advance `round_num`.
//!
//! Each phase completes for the whole population before the next begins. A
//! failure in steps 2 or 3 clears all pending actions and leaves the last
//! fully committed round untouched.

pub mod rng;

use std::sync::atomic::{AtomicBool, Ordering};

use mab_events::{
    AgentId, AgentMetadata, EnvironmentRow, ExperimentRecord, HistoryTable, NetworkEdge, OptionId,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::{ActionSnapshot, Agent, CommitOutcome, DecideContext};
use crate::bandit::Environment;
use crate::error::{ConfigurationError, EngineResult};
use crate::graph::SocialGraph;
use rng::{agent_stream, Phase};

/// One experiment: environment, graph, agents and the round counter.
pub struct Simulation {
    experiment_id: u64,
    seed: u64,
    environment: Environment,
    graph: Box<dyn SocialGraph>,
    agents: Vec<Box<dyn Agent>>,
    round_num: u64,
    parallel: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("experiment_id", &self.experiment_id)
            .field("seed", &self.seed)
            .field("agents", &self.agents.len())
            .field("round_num", &self.round_num)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl Simulation {
    /// Builds a simulation. Agent ids must be exactly `0..n` in order, every
    /// agent must be fresh, and the graph must have `n` nodes.
    pub fn new(
        experiment_id: u64,
        agents: Vec<Box<dyn Agent>>,
        environment: Environment,
        graph: impl SocialGraph + 'static,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        if graph.node_count() != agents.len() {
            return Err(ConfigurationError::GraphSizeMismatch {
                graph_nodes: graph.node_count(),
                agents: agents.len(),
            });
        }
        for (position, agent) in agents.iter().enumerate() {
            if agent.id().index() != position {
                return Err(ConfigurationError::AgentIdMismatch {
                    expected: agents.len(),
                    position,
                    found: agent.id(),
                });
            }
            if !agent.action_history().is_empty()
                || !agent.payoff_history().is_empty()
                || agent.pending_action().is_some()
            {
                return Err(ConfigurationError::AgentNotFresh { agent: agent.id() });
            }
        }

        Ok(Self {
            experiment_id,
            seed,
            environment,
            graph: Box::new(graph),
            agents,
            round_num: 0,
            parallel: true,
        })
    }

    /// Run phases on the rayon pool (default) or on the calling thread.
    /// Results are identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn experiment_id(&self) -> u64 {
        self.experiment_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of fully completed rounds.
    pub fn round_num(&self) -> u64 {
        self.round_num
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn graph(&self) -> &dyn SocialGraph {
        self.graph.as_ref()
    }

    pub fn agents(&self) -> &[Box<dyn Agent>] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&dyn Agent> {
        self.agents.get(id.index()).map(|agent| agent.as_ref())
    }

    /// Runs exactly one round.
    pub fn run_round(&mut self) -> EngineResult<()> {
        let round = self.round_num;
        let snapshot = ActionSnapshot::capture(&self.agents);

        if let Err(e) = self.decide_phase(round, &snapshot) {
            warn!("Round {} aborted during decide phase: {}", round, e);
            self.clear_pending();
            return Err(e);
        }

        let outcomes = match self.stage_commits(round) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!("Round {} aborted during commit phase: {}", round, e);
                self.clear_pending();
                return Err(e);
            }
        };

        self.apply_commits(outcomes);
        self.round_num += 1;

        debug!(
            "Round {} committed for {} agents",
            round,
            self.agents.len()
        );
        if self.environment.is_switch_round(self.round_num) {
            info!("Regime switch: new regime active from round {}", self.round_num);
        }
        Ok(())
    }

    /// Runs `n_rounds` rounds, stopping at the first failure.
    pub fn run(&mut self, n_rounds: u64) -> EngineResult<()> {
        info!(
            "Experiment {}: running {} rounds with {} agents (seed {})",
            self.experiment_id,
            n_rounds,
            self.agents.len(),
            self.seed
        );
        for _ in 0..n_rounds {
            self.run_round()?;
        }
        info!(
            "Experiment {}: completed {} rounds",
            self.experiment_id, self.round_num
        );
        Ok(())
    }

    /// Like [`Simulation::run`], but checks `cancel` before every round.
    /// Returns the number of rounds completed by this call.
    pub fn run_until_cancelled(&mut self, n_rounds: u64, cancel: &AtomicBool) -> EngineResult<u64> {
        let start = self.round_num;
        for _ in 0..n_rounds {
            if cancel.load(Ordering::Relaxed) {
                warn!(
                    "Experiment {}: cancelled after round {}",
                    self.experiment_id, self.round_num
                );
                break;
            }
            self.run_round()?;
        }
        Ok(self.round_num - start)
    }

    fn decide_phase(&mut self, round: u64, snapshot: &ActionSnapshot) -> EngineResult<()> {
        let seed = self.seed;
        let environment = &self.environment;
        let graph = self.graph.as_ref();

        let decide = |agent: &mut Box<dyn Agent>| -> EngineResult<()> {
            let id = agent.id();
            let ctx = DecideContext {
                round,
                neighbors: graph.neighbors(id),
                environment,
                last_actions: snapshot,
            };
            let mut rng = agent_stream(seed, round, id, Phase::Decide);
            agent.decide(&ctx, &mut rng).map(|_| ())
        };

        if self.parallel {
            self.agents.par_iter_mut().map(decide).collect()
        } else {
            self.agents.iter_mut().map(decide).collect()
        }
    }

    fn stage_commits(&self, round: u64) -> EngineResult<Vec<CommitOutcome>> {
        let seed = self.seed;
        let environment = &self.environment;

        let stage = |agent: &Box<dyn Agent>| -> EngineResult<CommitOutcome> {
            let mut rng = agent_stream(seed, round, agent.id(), Phase::Commit);
            agent.stage_commit(round, environment, &mut rng)
        };

        if self.parallel {
            self.agents.par_iter().map(stage).collect()
        } else {
            self.agents.iter().map(stage).collect()
        }
    }

    fn apply_commits(&mut self, outcomes: Vec<CommitOutcome>) {
        if self.parallel {
            self.agents
                .par_iter_mut()
                .zip(outcomes.into_par_iter())
                .for_each(|(agent, outcome)| agent.apply_commit(outcome));
        } else {
            for (agent, outcome) in self.agents.iter_mut().zip(outcomes) {
                agent.apply_commit(outcome);
            }
        }
    }

    fn clear_pending(&mut self) {
        for agent in &mut self.agents {
            agent.clear_pending();
        }
    }

    fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|agent| agent.id()).collect()
    }

    /// Actions by round (rows) and agent (columns).
    pub fn action_table(&self) -> HistoryTable<OptionId> {
        let columns: Vec<&[OptionId]> = self
            .agents
            .iter()
            .map(|agent| agent.action_history())
            .collect();
        HistoryTable::from_columns(self.agent_ids(), &columns, self.round_num as usize)
    }

    /// Payoffs by round (rows) and agent (columns).
    pub fn payoff_table(&self) -> HistoryTable<f64> {
        let columns: Vec<&[f64]> = self
            .agents
            .iter()
            .map(|agent| agent.payoff_history())
            .collect();
        HistoryTable::from_columns(self.agent_ids(), &columns, self.round_num as usize)
    }

    pub fn environment_table(&self) -> Vec<EnvironmentRow> {
        self.environment.describe()
    }

    pub fn agent_metadata(&self) -> Vec<AgentMetadata> {
        self.agents
            .iter()
            .map(|agent| agent.metadata(self.graph.neighbors(agent.id()).len()))
            .collect()
    }

    pub fn network_edges(&self) -> Vec<NetworkEdge> {
        self.graph.edges()
    }

    /// Every export table bundled for the serialization layer.
    pub fn record(&self) -> ExperimentRecord {
        ExperimentRecord {
            run_id: Uuid::new_v4(),
            experiment_id: self.experiment_id,
            seed: self.seed,
            rounds_completed: self.round_num,
            action_history: self.action_table(),
            payoff_history: self.payoff_table(),
            environment: self.environment_table(),
            agent_metadata: self.agent_metadata(),
            network: self.network_edges(),
        }
    }
}

/// Builds a simulation and runs it for `n_rounds`.
pub fn run_experiment(
    experiment_id: u64,
    n_rounds: u64,
    agents: Vec<Box<dyn Agent>>,
    environment: Environment,
    graph: impl SocialGraph + 'static,
    seed: u64,
) -> EngineResult<Simulation> {
    let mut simulation = Simulation::new(experiment_id, agents, environment, graph, seed)?;
    simulation.run(n_rounds)?;
    Ok(simulation)
}
