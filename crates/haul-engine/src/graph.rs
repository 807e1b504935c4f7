//! Undirected weighted graph over agent ids.
//!
//! Nodes remember the [`RoleKind`] of the agent they stand for so that a
//! read-only [`WorldView`](crate::WorldView) can answer role questions
//! without touching the agent map. Adjacency is kept in insertion order,
//! which makes "the order returned by the neighbor query" well defined
//! and identical across runs.

use haul_core::AgentId;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::agent::RoleKind;

/// Neighbor list returned by graph queries.
///
/// Inline capacity covers a ring warehouse plus a handful of parked
/// trucks without spilling to the heap.
pub type Neighbors = SmallVec<[AgentId; 8]>;

/// What an edge stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Topology: a road between two nodes. Movement follows route edges.
    Route,
    /// A truck parked at a node. Mirrors `Truck::location`; never a
    /// movement target.
    Occupancy,
}

/// Edge payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Edge weight (route length, cost, ...).
    pub weight: f64,
    /// What the edge stands for.
    pub kind: EdgeKind,
}

impl Edge {
    /// A route edge with the given weight.
    pub fn route(weight: f64) -> Self {
        Self {
            weight,
            kind: EdgeKind::Route,
        }
    }

    /// A unit-weight occupancy edge.
    pub fn occupancy() -> Self {
        Self {
            weight: 1.0,
            kind: EdgeKind::Occupancy,
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    kind: RoleKind,
    adjacency: IndexMap<AgentId, Edge>,
}

/// Undirected weighted graph keyed by [`AgentId`].
///
/// Each edge is stored in both endpoints' adjacency maps. Removal uses
/// `shift_remove` throughout so that surviving neighbors keep their
/// relative order.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: IndexMap<AgentId, Node>,
    edge_count: usize,
}

impl Graph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an isolated node. Returns `false` if it already exists.
    pub fn add_node(&mut self, id: AgentId, kind: RoleKind) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(
            id,
            Node {
                kind,
                adjacency: IndexMap::new(),
            },
        );
        true
    }

    /// Remove a node and every incident edge.
    ///
    /// Returns the number of edges removed, or `None` if the node was
    /// absent.
    pub fn remove_node(&mut self, id: AgentId) -> Option<usize> {
        let node = self.nodes.shift_remove(&id)?;
        for other in node.adjacency.keys() {
            if let Some(n) = self.nodes.get_mut(other) {
                n.adjacency.shift_remove(&id);
            }
        }
        let removed = node.adjacency.len();
        self.edge_count -= removed;
        Some(removed)
    }

    /// Whether a node exists.
    pub fn contains(&self, id: AgentId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Role of the agent behind a node.
    pub fn kind(&self, id: AgentId) -> Option<RoleKind> {
        self.nodes.get(&id).map(|n| n.kind)
    }

    /// Add or update the edge `a`-`b`.
    ///
    /// Returns `true` if the edge is new. Both endpoints must exist and
    /// differ; callers validate this first.
    pub fn set_edge(&mut self, a: AgentId, b: AgentId, edge: Edge) -> bool {
        debug_assert!(a != b, "self-loop {a}");
        debug_assert!(self.contains(a) && self.contains(b), "edge {a}-{b} to missing node");

        let is_new = match self.nodes.get_mut(&a) {
            Some(node) => node.adjacency.insert(b, edge).is_none(),
            None => return false,
        };
        if let Some(node) = self.nodes.get_mut(&b) {
            node.adjacency.insert(a, edge);
        }
        if is_new {
            self.edge_count += 1;
        }
        is_new
    }

    /// Remove the edge `a`-`b`, returning it if it existed.
    pub fn remove_edge(&mut self, a: AgentId, b: AgentId) -> Option<Edge> {
        let edge = self.nodes.get_mut(&a)?.adjacency.shift_remove(&b)?;
        if let Some(node) = self.nodes.get_mut(&b) {
            node.adjacency.shift_remove(&a);
        }
        self.edge_count -= 1;
        Some(edge)
    }

    /// The edge `a`-`b`, if any.
    pub fn edge(&self, a: AgentId, b: AgentId) -> Option<&Edge> {
        self.nodes.get(&a)?.adjacency.get(&b)
    }

    /// All neighbors of `id` in adjacency order. Empty if absent.
    pub fn neighbors(&self, id: AgentId) -> Neighbors {
        self.nodes
            .get(&id)
            .map(|n| n.adjacency.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Neighbors of `id` reached over edges of one kind, in adjacency order.
    pub fn neighbors_by(&self, id: AgentId, kind: EdgeKind) -> Neighbors {
        self.nodes
            .get(&id)
            .map(|n| {
                n.adjacency
                    .iter()
                    .filter(|(_, e)| e.kind == kind)
                    .map(|(other, _)| *other)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.nodes.keys().copied()
    }

    /// Every undirected edge exactly once, as `(lower id, higher id, edge)`.
    ///
    /// Ordered by the lower endpoint's insertion order, then adjacency
    /// order.
    pub fn edges(&self) -> impl Iterator<Item = (AgentId, AgentId, Edge)> + '_ {
        self.nodes.iter().flat_map(|(a, node)| {
            node.adjacency
                .iter()
                .filter(move |(b, _)| *a < **b)
                .map(move |(b, e)| (*a, *b, *e))
        })
    }
}
