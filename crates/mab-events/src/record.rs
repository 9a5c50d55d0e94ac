//! Experiment Record
//!
//! Bundle of every export table produced by one run, handed to the
//! serialization layer in a single piece.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AgentMetadata, EnvironmentRow, HistoryTable, NetworkEdge, OptionId};

/// Builds the file-name stem used for every table of an experiment.
pub fn generate_record_name(experiment_id: u64, table: &str) -> String {
    format!("experiment_{}_{}", experiment_id, table)
}

/// All committed state of a run, projected into tables.
///
/// Only rounds `0..rounds_completed` appear in the history tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub run_id: Uuid,
    pub experiment_id: u64,
    pub seed: u64,
    pub rounds_completed: u64,
    pub action_history: HistoryTable<OptionId>,
    pub payoff_history: HistoryTable<f64>,
    pub environment: Vec<EnvironmentRow>,
    pub agent_metadata: Vec<AgentMetadata>,
    #[serde(default)]
    pub network: Vec<NetworkEdge>,
}

impl ExperimentRecord {
    /// Fraction of all (round, agent) cells in which `option` was chosen.
    pub fn option_share(&self, option: OptionId) -> f64 {
        let total: usize = self.action_history.rows.iter().map(Vec::len).sum();
        if total == 0 {
            return 0.0;
        }
        let hits = self
            .action_history
            .rows
            .iter()
            .flatten()
            .filter(|chosen| **chosen == option)
            .count();
        hits as f64 / total as f64
    }

    /// Mean payoff per round across the population.
    pub fn mean_payoff_by_round(&self) -> Vec<f64> {
        self.payoff_history
            .rows
            .iter()
            .map(|row| {
                if row.is_empty() {
                    0.0
                } else {
                    row.iter().sum::<f64>() / row.len() as f64
                }
            })
            .collect()
    }

    /// Serializes the record to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the record to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
