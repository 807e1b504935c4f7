//! Scenario construction: the warehouse ring and truck placement.

use haul_core::{AgentId, IdAllocator};
use haul_engine::{Agent, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::EnvConfig;

/// A freshly built world plus the id lists the adapter needs.
///
/// Ids come from one [`IdAllocator`], so both lists are sorted and
/// "id order" equals creation order.
#[derive(Debug)]
pub struct Scenario {
    /// The world.
    pub world: World,
    /// Warehouse ids, ascending.
    pub warehouses: Vec<AgentId>,
    /// Truck ids, ascending.
    pub trucks: Vec<AgentId>,
    /// Allocator for agents spawned later (tasks).
    pub ids: IdAllocator,
}

/// Build `W` warehouses in a ring and `T` trucks placed uniformly at random.
///
/// Ring edges join `i` and `(i + 1) mod W`; `W == 1` has no edge and
/// `W == 2` a single one. Placement draws from `rng`.
pub fn build(config: &EnvConfig, world: World, rng: &mut ChaCha8Rng) -> Scenario {
    let mut world = world;
    let mut ids = IdAllocator::new();

    let warehouses: Vec<AgentId> = (0..config.warehouse_count)
        .map(|_| ids.allocate())
        .collect();
    for &w in &warehouses {
        world
            .add_agent(Agent::warehouse(w))
            .expect("allocated ids are unique");
    }
    for (a, b) in ring_pairs(&warehouses) {
        world
            .connect_agents(a, b, 1.0)
            .expect("ring endpoints are live and distinct");
    }

    let trucks: Vec<AgentId> = (0..config.truck_count).map(|_| ids.allocate()).collect();
    for &t in &trucks {
        world
            .add_agent(Agent::truck(t, config.truck_capacity))
            .expect("allocated ids are unique");
        let start = warehouses[rng.random_range(0..warehouses.len())];
        world
            .relocate(t, start)
            .expect("trucks start at a live warehouse");
    }

    Scenario {
        world,
        warehouses,
        trucks,
        ids,
    }
}

/// Edges of the ring over `nodes`, without self-loops or duplicates.
pub fn ring_pairs(nodes: &[AgentId]) -> Vec<(AgentId, AgentId)> {
    match nodes.len() {
        0 | 1 => Vec::new(),
        2 => vec![(nodes[0], nodes[1])],
        n => (0..n).map(|i| (nodes[i], nodes[(i + 1) % n])).collect(),
    }
}
