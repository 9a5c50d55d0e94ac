//! Social Graph
//!
//! Static, undirected adjacency between agents. The engine only ever asks a
//! graph for the neighbors of a node; topology generation lives in
//! [`crate::setup::network`].

use mab_events::{AgentId, NetworkEdge};

use crate::error::ConfigurationError;

/// Read-only neighbor query over a fixed node set `0..node_count`.
pub trait SocialGraph: Send + Sync {
    fn node_count(&self) -> usize;

    /// Neighbors of `agent`, ascending. Unknown agents have no neighbors.
    fn neighbors(&self, agent: AgentId) -> &[AgentId];

    /// Every undirected edge once, sorted.
    fn edges(&self) -> Vec<NetworkEdge> {
        let mut edges = Vec::new();
        for node in 0..self.node_count() as u32 {
            let agent = AgentId(node);
            for &other in self.neighbors(agent) {
                if agent < other {
                    edges.push(NetworkEdge::new(agent, other));
                }
            }
        }
        edges
    }
}

/// Adjacency-list graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyGraph {
    adjacency: Vec<Vec<AgentId>>,
}

impl AdjacencyGraph {
    /// Graph with `node_count` isolated nodes.
    pub fn empty(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Builds a graph from an edge list. Duplicate edges collapse; self loops
    /// and out-of-range endpoints are rejected.
    pub fn from_edges(
        node_count: usize,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> Result<Self, ConfigurationError> {
        let mut graph = Self::empty(node_count);
        for (a, b) in edges {
            if a as usize >= node_count || b as usize >= node_count {
                return Err(ConfigurationError::InvalidNetwork(format!(
                    "edge ({}, {}) references a node outside 0..{}",
                    a, b, node_count
                )));
            }
            if a == b {
                return Err(ConfigurationError::InvalidNetwork(format!(
                    "self loop on node {}",
                    a
                )));
            }
            graph.add_edge(AgentId(a), AgentId(b));
        }
        Ok(graph)
    }

    /// Every pair of nodes connected.
    pub fn complete(node_count: usize) -> Self {
        let adjacency = (0..node_count as u32)
            .map(|node| {
                (0..node_count as u32)
                    .filter(|&other| other != node)
                    .map(AgentId)
                    .collect()
            })
            .collect();
        Self { adjacency }
    }

    /// Ring where each node links to its `degree / 2` nearest nodes on
    /// either side. `degree` must be even and smaller than `node_count`.
    pub fn ring_lattice(node_count: usize, degree: usize) -> Result<Self, ConfigurationError> {
        if degree % 2 != 0 {
            return Err(ConfigurationError::InvalidNetwork(format!(
                "ring lattice degree must be even, got {}",
                degree
            )));
        }
        if degree >= node_count {
            return Err(ConfigurationError::InvalidNetwork(format!(
                "ring lattice degree {} needs more than {} nodes",
                degree, node_count
            )));
        }

        let mut graph = Self::empty(node_count);
        for node in 0..node_count {
            for offset in 1..=degree / 2 {
                let other = (node + offset) % node_count;
                graph.add_edge(AgentId(node as u32), AgentId(other as u32));
            }
        }
        Ok(graph)
    }

    /// Adds an undirected edge. Returns false if it already existed.
    pub fn add_edge(&mut self, a: AgentId, b: AgentId) -> bool {
        if a == b || self.has_edge(a, b) {
            return false;
        }
        insert_sorted(&mut self.adjacency[a.index()], b);
        insert_sorted(&mut self.adjacency[b.index()], a);
        true
    }

    /// Removes an undirected edge. Returns false if it did not exist.
    pub fn remove_edge(&mut self, a: AgentId, b: AgentId) -> bool {
        if !self.has_edge(a, b) {
            return false;
        }
        self.adjacency[a.index()].retain(|n| *n != b);
        self.adjacency[b.index()].retain(|n| *n != a);
        true
    }

    pub fn has_edge(&self, a: AgentId, b: AgentId) -> bool {
        self.adjacency
            .get(a.index())
            .is_some_and(|neighbors| neighbors.binary_search(&b).is_ok())
    }

    pub fn degree(&self, agent: AgentId) -> usize {
        self.neighbors(agent).len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Nodes with no neighbors.
    pub fn isolated_nodes(&self) -> Vec<AgentId> {
        (0..self.adjacency.len() as u32)
            .map(AgentId)
            .filter(|agent| self.adjacency[agent.index()].is_empty())
            .collect()
    }
}

fn insert_sorted(neighbors: &mut Vec<AgentId>, agent: AgentId) {
    if let Err(pos) = neighbors.binary_search(&agent) {
        neighbors.insert(pos, agent);
    }
}

impl SocialGraph for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, agent: AgentId) -> &[AgentId] {
        self.adjacency
            .get(agent.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
