//! Benchmark profiles for the Haul simulation kernel.
//!
//! - [`reference_profile`]: 3 trucks on a 10-warehouse ring
//! - [`stress_profile`]: 100 trucks on a 200-warehouse ring
//! - [`chatty_world`]: a world where every truck queries every tick

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use haul_core::AgentId;
use haul_engine::{Agent, World};
use haul_env::EnvConfig;

/// Small scenario matching typical training runs.
pub fn reference_profile() -> EnvConfig {
    EnvConfig::new(3, 10).with_spawn_probability(0.2)
}

/// Large scenario for throughput measurements.
pub fn stress_profile() -> EnvConfig {
    EnvConfig::new(100, 200)
        .with_spawn_probability(0.5)
        .with_horizon(u64::MAX)
}

/// `warehouses` stocked warehouses in a ring with `trucks` parked
/// round-robin. Every empty truck sends a query each tick and every
/// warehouse answers, so message traffic scales with `trucks`.
pub fn chatty_world(warehouses: u64, trucks: u64, seed: u64) -> World {
    let mut world = World::with_seed(seed);
    for w in 0..warehouses {
        let mut agent = Agent::warehouse(AgentId(w));
        if let Some(inv) = agent.as_warehouse_mut() {
            inv.push_task(AgentId(u64::MAX - w));
        }
        world.add_agent(agent).unwrap();
    }
    for w in 0..warehouses {
        world
            .connect_agents(AgentId(w), AgentId((w + 1) % warehouses), 1.0)
            .unwrap();
    }
    for t in 0..trucks {
        let id = AgentId(warehouses + t);
        world.add_agent(Agent::truck(id, 1)).unwrap();
        world.relocate(id, AgentId(t % warehouses)).unwrap();
    }
    world
}
