//! Decision provider contract and bundled providers.
//!
//! A provider maps an agent's local state and a read-only world view to a
//! list of opaque actions. The kernel calls [`decide`](DecisionProvider::decide)
//! once per agent per tick when a provider is attached and forwards
//! [`update`](DecisionProvider::update) when a driver reports feedback. It
//! never looks inside: scripted, random, and learned policies all plug in
//! the same way.

use haul_core::{Action, AgentState};
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::view::WorldView;

/// Pluggable policy consumed by agents.
///
/// Providers are `Send` so a world can move between threads. They are
/// only ever called from the thread that owns the world.
pub trait DecisionProvider: Send {
    /// Human-readable name for logs.
    fn name(&self) -> &str {
        "provider"
    }

    /// Choose actions for this tick.
    fn decide(&mut self, state: &AgentState, view: &WorldView<'_>) -> Vec<Action>;

    /// Receive feedback after an environment step. Default: ignore.
    fn update(&mut self, _reward: f64, _done: bool) {}
}

/// Picks one action uniformly from a fixed list each tick.
///
/// Seeded explicitly, so a world driven by random providers is still
/// reproducible.
#[derive(Clone, Debug)]
pub struct RandomProvider {
    choices: Vec<Action>,
    rng: ChaCha8Rng,
}

impl RandomProvider {
    /// Choose from `choices` using a ChaCha8 stream seeded with `seed`.
    pub fn new(choices: Vec<Action>, seed: u64) -> Self {
        Self {
            choices,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DecisionProvider for RandomProvider {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&mut self, _state: &AgentState, _view: &WorldView<'_>) -> Vec<Action> {
        self.choices.choose(&mut self.rng).copied().into_iter().collect()
    }
}

/// Wraps a closure as a provider.
pub struct RuleProvider<F> {
    name: String,
    rules: F,
}

impl<F> RuleProvider<F>
where
    F: FnMut(&AgentState, &WorldView<'_>) -> Vec<Action> + Send,
{
    /// Name the closure and wrap it.
    pub fn new(name: impl Into<String>, rules: F) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

impl<F> DecisionProvider for RuleProvider<F>
where
    F: FnMut(&AgentState, &WorldView<'_>) -> Vec<Action> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, state: &AgentState, view: &WorldView<'_>) -> Vec<Action> {
        (self.rules)(state, view)
    }
}
