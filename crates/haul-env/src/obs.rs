//! Observation encoding.
//!
//! Layout, fixed for an adapter's lifetime:
//!
//! ```text
//! [ loaded(t0), fp(t0), loaded(t1), fp(t1), ..., len(w0), len(w1), ... ]
//! ```
//!
//! Trucks and warehouses appear in id order. `fp` is the location
//! fingerprint: `(rank + 1) / W` for the warehouse at sorted rank `rank`,
//! `0.0` for no location.

use haul_core::AgentId;
use haul_engine::World;

/// Flat observation vector.
pub type Observation = Vec<f32>;

/// Which agents an observation covers, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObservationLayout {
    trucks: Vec<AgentId>,
    warehouses: Vec<AgentId>,
}

impl ObservationLayout {
    /// Both lists must be sorted ascending.
    pub fn new(trucks: Vec<AgentId>, warehouses: Vec<AgentId>) -> Self {
        debug_assert!(trucks.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(warehouses.windows(2).all(|w| w[0] < w[1]));
        Self { trucks, warehouses }
    }

    /// `2 * T + W`.
    pub fn len(&self) -> usize {
        2 * self.trucks.len() + self.warehouses.len()
    }

    /// Whether the layout covers no agent.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fingerprint of a location. Non-warehouse or absent locations map
    /// to `0.0`.
    pub fn fingerprint(&self, location: Option<AgentId>) -> f32 {
        location
            .and_then(|loc| self.warehouses.binary_search(&loc).ok())
            .map_or(0.0, |rank| (rank + 1) as f32 / self.warehouses.len() as f32)
    }

    /// Read the observation from `world`. Missing agents encode as zeros.
    pub fn encode(&self, world: &World) -> Observation {
        let mut obs = Vec::with_capacity(self.len());
        for &t in &self.trucks {
            let truck = world.agent(t).and_then(|a| a.as_truck());
            let loaded = truck.is_some_and(|t| !t.cargo().is_empty());
            obs.push(if loaded { 1.0 } else { 0.0 });
            obs.push(self.fingerprint(truck.and_then(|t| t.location())));
        }
        for &w in &self.warehouses {
            let len = world
                .agent(w)
                .and_then(|a| a.as_warehouse())
                .map_or(0, |w| w.len());
            obs.push(len as f32);
        }
        debug_assert_eq!(obs.len(), self.len());
        obs
    }
}
