//! Export Tables
//!
//! Tabular projections of a completed (or partially completed) run.
//!
//! History tables are laid out with one row per round and one column per
//! agent, matching the order of `agent_ids`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AgentId, OptionId};

/// Per-round-by-agent table (actions or payoffs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTable<T> {
    /// Column headers, one per agent
    pub agent_ids: Vec<AgentId>,
    /// `rows[round][column]`
    pub rows: Vec<Vec<T>>,
}

impl<T: Clone> HistoryTable<T> {
    /// Builds a table from per-agent columns.
    ///
    /// Every column must hold at least `rounds` entries; only the first
    /// `rounds` are used.
    pub fn from_columns(agent_ids: Vec<AgentId>, columns: &[&[T]], rounds: usize) -> Self {
        debug_assert_eq!(agent_ids.len(), columns.len());
        let rows = (0..rounds)
            .map(|round| columns.iter().map(|column| column[round].clone()).collect())
            .collect();
        Self { agent_ids, rows }
    }

    /// Number of rounds (rows) in the table.
    pub fn rounds(&self) -> usize {
        self.rows.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agent_ids.len()
    }

    /// Entry for one agent at one round.
    pub fn cell(&self, round: usize, agent: AgentId) -> Option<&T> {
        let column = self.agent_ids.iter().position(|id| *id == agent)?;
        self.rows.get(round).and_then(|row| row.get(column))
    }

    /// Full history of a single agent, oldest first.
    pub fn column(&self, agent: AgentId) -> Option<Vec<T>> {
        let column = self.agent_ids.iter().position(|id| *id == agent)?;
        Some(self.rows.iter().map(|row| row[column].clone()).collect())
    }
}

/// Agent variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentKind {
    /// Softmax exploitation mixed with neighbor imitation
    VoterModel,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::VoterModel => write!(f, "VOTER_MODEL"),
        }
    }
}

/// One row of agent metadata: id, type and decision-rule parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub agent_id: AgentId,
    pub agent_type: AgentKind,
    pub softmax_prob: f64,
    /// "ewma" or "window"
    pub memory_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_decay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_window: Option<usize>,
    /// Number of neighbors in the social graph
    #[serde(default)]
    pub degree: usize,
}

/// One option of one regime in the environment description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRow {
    pub regime_index: usize,
    pub regime_start_round: u64,
    pub option_id: OptionId,
    /// Distribution family, e.g. "NORMAL_DISTRIBUTION"
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Undirected edge of the social graph, stored with `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub source: AgentId,
    pub target: AgentId,
}

impl NetworkEdge {
    pub fn new(a: AgentId, b: AgentId) -> Self {
        if a <= b {
            Self { source: a, target: b }
        } else {
            Self { source: b, target: a }
        }
    }
}
