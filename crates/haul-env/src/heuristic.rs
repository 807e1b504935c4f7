//! Scripted action sources for driving an environment without a learner.

use haul_core::Action;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::env::LogisticsEnv;

/// Moves every truck to a uniformly random route neighbor each step.
///
/// Trucks at a node without routes stay.
#[derive(Clone, Debug)]
pub struct RandomWalk {
    rng: ChaCha8Rng,
}

impl RandomWalk {
    /// A walker drawing from a ChaCha8 stream seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One action per truck of `env`, in id order.
    pub fn actions(&mut self, env: &LogisticsEnv) -> Vec<Action> {
        env.trucks()
            .iter()
            .map(|&truck| {
                let degree = env
                    .world()
                    .agent(truck)
                    .and_then(|a| a.as_truck())
                    .and_then(|t| t.location())
                    .map_or(0, |loc| env.world().route_neighbors(loc).len());
                if degree == 0 {
                    0
                } else {
                    self.rng.random_range(1..=degree as Action)
                }
            })
            .collect()
    }
}
