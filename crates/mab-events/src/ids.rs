//! Identifier Types
//!
//! Agents and options are addressed by small integer ids. Agent ids are
//! dense (`0..n`) and double as node ids in the social graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an agent (and of its node in the social graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Position of this agent in a dense `0..n` population.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(id: u32) -> Self {
        AgentId(id)
    }
}

/// Identifier of an option ("arm") within a regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub u32);

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option_{}", self.0)
    }
}

impl From<u32> for OptionId {
    fn from(id: u32) -> Self {
        OptionId(id)
    }
}
