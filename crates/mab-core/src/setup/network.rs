//! Network Setup
//!
//! Topology generators for the social graph. The small-world generator
//! follows the Watts-Strogatz construction: start from a ring lattice, then
//! rewire each lattice edge with probability `p` to a uniformly chosen node.

use mab_events::AgentId;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{NetworkConfig, NetworkKind};
use crate::error::ConfigurationError;
use crate::graph::AdjacencyGraph;

/// Keeps the network stream apart from the agent streams.
const NETWORK_SEED_SALT: u64 = 0x6e65_7477_6f72_6b;

/// Checks network parameters against the population size.
pub fn validate(config: &NetworkConfig, node_count: usize) -> Result<(), ConfigurationError> {
    if config.kind == NetworkKind::Complete {
        return Ok(());
    }
    if config.degree % 2 != 0 || config.degree >= node_count {
        return Err(ConfigurationError::InvalidNetwork(format!(
            "degree must be even and below the population size ({}), got {}",
            node_count, config.degree
        )));
    }
    if config.kind == NetworkKind::WattsStrogatz && !(0.0..=1.0).contains(&config.rewiring_prob) {
        return Err(ConfigurationError::InvalidNetwork(format!(
            "rewiring probability must lie in [0, 1], got {}",
            config.rewiring_prob
        )));
    }
    Ok(())
}

/// Builds the configured topology over `node_count` agents.
pub fn build(
    config: &NetworkConfig,
    node_count: usize,
    seed: u64,
) -> Result<AdjacencyGraph, ConfigurationError> {
    validate(config, node_count)?;
    match config.kind {
        NetworkKind::Complete => Ok(AdjacencyGraph::complete(node_count)),
        NetworkKind::RingLattice => AdjacencyGraph::ring_lattice(node_count, config.degree),
        NetworkKind::WattsStrogatz => {
            let mut rng = SmallRng::seed_from_u64(seed ^ NETWORK_SEED_SALT);
            watts_strogatz(node_count, config.degree, config.rewiring_prob, &mut rng)
        }
    }
}

/// Small-world graph: ring lattice of degree `k` with each edge rewired
/// with probability `p`. Edge count is preserved.
pub fn watts_strogatz<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> Result<AdjacencyGraph, ConfigurationError> {
    let mut graph = AdjacencyGraph::ring_lattice(n, k)?;

    for offset in 1..=k / 2 {
        for node in 0..n {
            if rng.gen::<f64>() >= p {
                continue;
            }
            let u = AgentId(node as u32);
            let v = AgentId(((node + offset) % n) as u32);
            // Fully connected node, nothing to rewire to
            if graph.degree(u) >= n - 1 {
                continue;
            }
            let mut w = AgentId(rng.gen_range(0..n) as u32);
            while w == u || graph.has_edge(u, w) {
                w = AgentId(rng.gen_range(0..n) as u32);
            }
            if graph.remove_edge(u, v) {
                graph.add_edge(u, w);
            }
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SocialGraph;

    #[test]
    fn test_zero_rewiring_is_ring() {
        let mut rng = SmallRng::seed_from_u64(1);
        let graph = watts_strogatz(10, 4, 0.0, &mut rng).unwrap();
        assert_eq!(graph, AdjacencyGraph::ring_lattice(10, 4).unwrap());
    }

    #[test]
    fn test_rewiring_preserves_edge_count() {
        let mut rng = SmallRng::seed_from_u64(99);
        let graph = watts_strogatz(50, 4, 0.3, &mut rng).unwrap();
        assert_eq!(graph.edge_count(), 100);
        assert_ne!(graph, AdjacencyGraph::ring_lattice(50, 4).unwrap());
        for node in 0..50 {
            assert!(!graph.neighbors(AgentId(node)).contains(&AgentId(node)));
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = NetworkConfig::default();
        let a = build(&config, 30, 5).unwrap();
        let b = build(&config, 30, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate() {
        let config = NetworkConfig {
            kind: NetworkKind::RingLattice,
            degree: 3,
            rewiring_prob: 0.0,
        };
        assert!(validate(&config, 10).is_err());

        let config = NetworkConfig {
            kind: NetworkKind::WattsStrogatz,
            degree: 4,
            rewiring_prob: 1.5,
        };
        assert!(validate(&config, 10).is_err());

        let config = NetworkConfig {
            kind: NetworkKind::Complete,
            degree: 3,
            rewiring_prob: 9.0,
        };
        assert!(validate(&config, 2).is_ok());
        assert_eq!(build(&config, 4, 0).unwrap().edge_count(), 6);
    }
}
