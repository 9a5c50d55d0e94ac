//! Shared data types for the social bandit experiment.
//!
//! This crate contains pure data structures with no simulation logic:
//! identifiers, export table shapes and the bundled experiment record.
//! It is a dependency for all other crates in the workspace.

pub mod ids;
pub mod record;
pub mod tables;

pub use ids::{AgentId, OptionId};

pub use tables::{
    AgentKind, AgentMetadata, EnvironmentRow, HistoryTable, NetworkEdge,
};

pub use record::{generate_record_name, ExperimentRecord};
