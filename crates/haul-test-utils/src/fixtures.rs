//! Reusable provider fixtures and world builders.
//!
//! - [`ScriptedProvider`] replays a fixed list of action batches.
//! - [`RecordingProvider`] records every `update` call into a shared log.
//! - [`ring_world`] / [`line_world`] build warehouse topologies.

use std::sync::{Arc, Mutex};

use haul_core::{Action, AgentId, AgentState};
use haul_engine::{Agent, DecisionProvider, World, WorldView};

/// Returns the next scripted batch each tick, then nothing.
pub struct ScriptedProvider {
    pub script: Vec<Vec<Action>>,
    cursor: usize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Vec<Action>>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Number of decide calls served so far.
    pub fn calls(&self) -> usize {
        self.cursor
    }
}

impl DecisionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decide(&mut self, _state: &AgentState, _view: &WorldView<'_>) -> Vec<Action> {
        let batch = self.script.get(self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        batch
    }
}

/// Shared log of `(reward, done)` pairs written by [`RecordingProvider`].
pub type FeedbackLog = Arc<Mutex<Vec<(f64, bool)>>>;

/// Returns no actions and records every `update` into a [`FeedbackLog`].
pub struct RecordingProvider {
    log: FeedbackLog,
}

impl RecordingProvider {
    /// A provider plus the handle tests read back from.
    pub fn new() -> (Self, FeedbackLog) {
        let log = FeedbackLog::default();
        (Self { log: Arc::clone(&log) }, log)
    }
}

impl DecisionProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn decide(&mut self, _state: &AgentState, _view: &WorldView<'_>) -> Vec<Action> {
        Vec::new()
    }

    fn update(&mut self, reward: f64, done: bool) {
        self.log.lock().unwrap().push((reward, done));
    }
}

/// `n` warehouses with ids `0..n` joined in a ring of unit-weight routes.
///
/// Skips the self-loop for `n == 1` and the duplicate edge for `n == 2`.
pub fn ring_world(n: u64, seed: u64) -> World {
    let mut world = World::with_seed(seed);
    for i in 0..n {
        world.add_agent(Agent::warehouse(AgentId(i))).unwrap();
    }
    if n >= 2 {
        for i in 0..n {
            let j = (i + 1) % n;
            if n == 2 && i == 1 {
                break;
            }
            world.connect_agents(AgentId(i), AgentId(j), 1.0).unwrap();
        }
    }
    world
}

/// `n` generic agents with ids `0..n` joined in a path.
pub fn line_world(n: u64, seed: u64) -> World {
    let mut world = World::with_seed(seed);
    for i in 0..n {
        world.add_agent(Agent::generic(AgentId(i))).unwrap();
    }
    for i in 1..n {
        world.connect_agents(AgentId(i - 1), AgentId(i), 1.0).unwrap();
    }
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_sizes() {
        assert_eq!(ring_world(1, 0).get_state().edge_count, 0);
        assert_eq!(ring_world(2, 0).get_state().edge_count, 1);
        assert_eq!(ring_world(3, 0).get_state().edge_count, 3);
        assert_eq!(ring_world(5, 0).get_state().edge_count, 5);
    }

    #[test]
    fn line_sizes() {
        let w = line_world(4, 0);
        assert_eq!(w.get_state().agent_count, 4);
        assert_eq!(w.get_state().edge_count, 3);
    }

    #[test]
    fn scripted_provider_runs_out() {
        let mut w = World::with_seed(0);
        let p = ScriptedProvider::new(vec![vec![1], vec![2, 3]]);
        w.add_agent(Agent::generic(AgentId(0)).with_provider(Box::new(p)))
            .unwrap();
        assert_eq!(w.tick().actions[&AgentId(0)], vec![1]);
        assert_eq!(w.tick().actions[&AgentId(0)], vec![2, 3]);
        assert!(w.tick().actions[&AgentId(0)].is_empty());
    }
}
