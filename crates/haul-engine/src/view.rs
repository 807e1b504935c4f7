//! Read-only world view handed to perceive and to decision providers.

use haul_core::{AgentId, TickId};

use crate::agent::RoleKind;
use crate::graph::{EdgeKind, Graph, Neighbors};

/// Read-only view of the world graph during a tick.
///
/// Borrowing only the graph (never the agent map) is what lets the world
/// hand a view to one agent while holding that agent mutably.
#[derive(Clone, Copy, Debug)]
pub struct WorldView<'w> {
    graph: &'w Graph,
    tick: TickId,
}

impl<'w> WorldView<'w> {
    /// Wrap a graph at a given tick.
    pub fn new(graph: &'w Graph, tick: TickId) -> Self {
        Self { graph, tick }
    }

    /// The tick being executed.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Number of live agents.
    pub fn agent_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether `id` is live.
    pub fn contains(&self, id: AgentId) -> bool {
        self.graph.contains(id)
    }

    /// Role of a live agent.
    pub fn kind(&self, id: AgentId) -> Option<RoleKind> {
        self.graph.kind(id)
    }

    /// All neighbors of `id`, in graph order.
    pub fn neighbors(&self, id: AgentId) -> Neighbors {
        self.graph.neighbors(id)
    }

    /// Nodes reachable from `id` over one route edge, in graph order.
    ///
    /// This is the list movement actions index into.
    pub fn route_neighbors(&self, id: AgentId) -> Neighbors {
        self.graph.neighbors_by(id, EdgeKind::Route)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &'w Graph {
        self.graph
    }
}
