//! Voter Model Agent
//!
//! Hybrid of individual reinforcement and social imitation. Each round after
//! the first, the agent either samples an option from a softmax over its
//! value estimates (with probability `softmax_prob`) or copies the last
//! committed action of a uniformly chosen neighbor.

use mab_events::{AgentId, AgentKind, AgentMetadata, OptionId};
use rand::rngs::SmallRng;
use rand::Rng;

use super::memory::{MemoryRule, ValueMemory};
use super::{Agent, CommitOutcome, DecideContext};
use crate::error::{ConfigurationError, EngineError, EngineResult};

/// Value given to every option at round 0, and to options the agent has
/// never seen. Mildly optimistic.
pub const NEUTRAL_PRIOR: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct VoterModelAgent {
    id: AgentId,
    softmax_prob: f64,
    memory: ValueMemory,
    initial_action: Option<OptionId>,
    pending_action: Option<OptionId>,
    action_history: Vec<OptionId>,
    payoff_history: Vec<f64>,
}

impl VoterModelAgent {
    pub fn new(
        id: AgentId,
        softmax_prob: f64,
        memory_rule: MemoryRule,
    ) -> Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&softmax_prob) {
            return Err(ConfigurationError::InvalidAgentParameter {
                name: "softmax_prob",
                value: softmax_prob,
                reason: "must lie in [0, 1]",
            });
        }
        memory_rule.validate()?;

        Ok(Self {
            id,
            softmax_prob,
            memory: ValueMemory::new(memory_rule),
            initial_action: None,
            pending_action: None,
            action_history: Vec::new(),
            payoff_history: Vec::new(),
        })
    }

    /// Fixes the round-0 decision instead of drawing it at random.
    pub fn with_initial_action(mut self, option: OptionId) -> Self {
        self.initial_action = Some(option);
        self
    }

    pub fn softmax_prob(&self) -> f64 {
        self.softmax_prob
    }

    pub fn memory(&self) -> &ValueMemory {
        &self.memory
    }

    fn first_round_choice(
        &mut self,
        ctx: &DecideContext<'_>,
        rng: &mut SmallRng,
    ) -> EngineResult<OptionId> {
        let options = ctx.environment.options(ctx.round)?;
        self.memory
            .reset_with_prior(options.iter().copied(), NEUTRAL_PRIOR);

        Ok(match self.initial_action {
            Some(option) => option,
            None => options[rng.gen_range(0..options.len())],
        })
    }

    /// Softmax over the options the active regime offers. Options missing
    /// from memory are valued at [`NEUTRAL_PRIOR`]; memory entries for
    /// options outside the regime are kept but not sampled.
    fn softmax_choice(
        &self,
        ctx: &DecideContext<'_>,
        rng: &mut SmallRng,
    ) -> EngineResult<OptionId> {
        let options = ctx.environment.options(ctx.round)?;
        let values: Vec<f64> = options
            .iter()
            .map(|option| self.memory.get(*option).unwrap_or(NEUTRAL_PRIOR))
            .collect();

        let index = sample_softmax(&values, rng);
        Ok(options[index])
    }

    fn imitate(&self, ctx: &DecideContext<'_>, rng: &mut SmallRng) -> EngineResult<OptionId> {
        if ctx.neighbors.is_empty() {
            return Err(EngineError::NoNeighbors { agent: self.id });
        }
        let neighbor = ctx.neighbors[rng.gen_range(0..ctx.neighbors.len())];
        ctx.last_actions
            .get(neighbor)
            .ok_or(EngineError::MissingHistory { agent: neighbor })
    }
}

/// Samples an index with probability proportional to `exp(values[i])`.
///
/// Values are shifted by their maximum before exponentiating, which leaves
/// the distribution unchanged.
fn sample_softmax(values: &[f64], rng: &mut SmallRng) -> usize {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let total: f64 = weights.iter().sum();

    pick_weighted(&weights, rng.gen::<f64>() * total)
}

/// Walks the cumulative weights until `roll` is used up.
fn pick_weighted(weights: &[f64], mut roll: f64) -> usize {
    for (i, weight) in weights.iter().enumerate() {
        roll -= weight;
        if roll < 0.0 {
            return i;
        }
    }

    // Rounding can leave a sliver past the end; never land on a zero weight
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}

impl Agent for VoterModelAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn kind(&self) -> AgentKind {
        AgentKind::VoterModel
    }

    fn pending_action(&self) -> Option<OptionId> {
        self.pending_action
    }

    fn clear_pending(&mut self) {
        self.pending_action = None;
    }

    fn action_history(&self) -> &[OptionId] {
        &self.action_history
    }

    fn payoff_history(&self) -> &[f64] {
        &self.payoff_history
    }

    fn value_estimate(&self, option: OptionId) -> Option<f64> {
        self.memory.get(option)
    }

    fn decide(&mut self, ctx: &DecideContext<'_>, rng: &mut SmallRng) -> EngineResult<OptionId> {
        let action = if ctx.round == 0 {
            self.first_round_choice(ctx, rng)?
        } else if rng.gen::<f64>() < self.softmax_prob {
            self.softmax_choice(ctx, rng)?
        } else {
            self.imitate(ctx, rng)?
        };

        self.pending_action = Some(action);
        Ok(action)
    }

    fn apply_commit(&mut self, outcome: CommitOutcome) {
        self.action_history.push(outcome.action);
        self.payoff_history.push(outcome.reward);
        self.memory.record(outcome.action, outcome.reward);
        self.pending_action = None;
    }

    fn metadata(&self, degree: usize) -> AgentMetadata {
        let rule = self.memory.rule();
        AgentMetadata {
            agent_id: self.id,
            agent_type: self.kind(),
            softmax_prob: self.softmax_prob,
            memory_rule: rule.name().to_string(),
            memory_decay: rule.decay(),
            memory_window: rule.window_len(),
            degree,
        }
    }
}
