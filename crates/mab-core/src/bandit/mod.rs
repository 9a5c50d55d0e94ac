//! Reward Environment
//!
//! Reward sources, the regimes that group them, and the regime-switching
//! environment that resolves which regime is active at a given round.

pub mod environment;
pub mod regime;
pub mod reward;

pub use environment::Environment;
pub use regime::Regime;
pub use reward::{RewardDistribution, RewardSource};
