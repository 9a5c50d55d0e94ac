//! Agents
//!
//! An agent takes part in every round through a two-phase contract:
//!
//! 1. **decide**: read the graph, the environment and the previous round's
//!    committed actions, then store a pending action locally.
//! 2. **commit**: pull a reward for the pending action, append to history and
//!    update private memory.
//!
//! The commit is split into a pure [`Agent::stage_commit`] that resolves the
//! reward and an infallible [`Agent::apply_commit`], so the engine can stage
//! the whole population before any agent is mutated.

pub mod memory;
pub mod voter;

pub use memory::{MemoryRule, ValueMemory};
pub use voter::{VoterModelAgent, NEUTRAL_PRIOR};

use mab_events::{AgentId, AgentKind, AgentMetadata, OptionId};
use rand::rngs::SmallRng;

use crate::bandit::Environment;
use crate::error::{EngineError, EngineResult};

/// Every agent's last committed action, frozen before a decide phase.
///
/// Indexed by agent id. Agents that have not committed yet map to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSnapshot {
    actions: Vec<Option<OptionId>>,
}

impl ActionSnapshot {
    pub fn new(actions: Vec<Option<OptionId>>) -> Self {
        Self { actions }
    }

    /// Captures the last committed action of each agent, in id order.
    pub fn capture(agents: &[Box<dyn Agent>]) -> Self {
        Self {
            actions: agents.iter().map(|agent| agent.last_action()).collect(),
        }
    }

    pub fn get(&self, agent: AgentId) -> Option<OptionId> {
        self.actions.get(agent.index()).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Read-only inputs of a decide phase.
#[derive(Debug, Clone, Copy)]
pub struct DecideContext<'a> {
    pub round: u64,
    /// Resolved from the social graph at call time
    pub neighbors: &'a [AgentId],
    pub environment: &'a Environment,
    /// Previous-round committed actions of the whole population
    pub last_actions: &'a ActionSnapshot,
}

/// A resolved commit, ready to be applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommitOutcome {
    pub round: u64,
    pub action: OptionId,
    pub reward: f64,
}

/// Decision-making entity taking part in the round protocol.
pub trait Agent: Send + Sync {
    fn id(&self) -> AgentId;

    fn kind(&self) -> AgentKind;

    fn pending_action(&self) -> Option<OptionId>;

    fn clear_pending(&mut self);

    fn action_history(&self) -> &[OptionId];

    fn payoff_history(&self) -> &[f64];

    /// Most recently committed action.
    fn last_action(&self) -> Option<OptionId> {
        self.action_history().last().copied()
    }

    /// Current value estimate for `option`, if the agent keeps one.
    fn value_estimate(&self, _option: OptionId) -> Option<f64> {
        None
    }

    /// Computes and stores the pending action for `ctx.round`.
    ///
    /// Must not touch state visible to other agents.
    fn decide(&mut self, ctx: &DecideContext<'_>, rng: &mut SmallRng) -> EngineResult<OptionId>;

    /// Resolves the reward for the pending action without mutating anything.
    fn stage_commit(
        &self,
        round: u64,
        environment: &Environment,
        rng: &mut SmallRng,
    ) -> EngineResult<CommitOutcome> {
        let action = self
            .pending_action()
            .ok_or(EngineError::NoPendingAction { agent: self.id() })?;
        let reward = environment.pull(action, round, rng)?;
        Ok(CommitOutcome {
            round,
            action,
            reward,
        })
    }

    /// Appends the outcome to history, updates memory, clears the pending
    /// action.
    fn apply_commit(&mut self, outcome: CommitOutcome);

    /// Stage and apply in one step. The pending action is cleared whether or
    /// not the commit succeeds.
    fn commit_round(
        &mut self,
        round: u64,
        environment: &Environment,
        rng: &mut SmallRng,
    ) -> EngineResult<()> {
        match self.stage_commit(round, environment, rng) {
            Ok(outcome) => {
                self.apply_commit(outcome);
                Ok(())
            }
            Err(e) => {
                self.clear_pending();
                Err(e)
            }
        }
    }

    /// Metadata row: id, type and decision-rule parameters.
    fn metadata(&self, degree: usize) -> AgentMetadata;
}
