//! The logistics environment: an observe/act loop over a [`World`].
//!
//! [`LogisticsEnv`] owns a world built from an [`EnvConfig`] and exposes
//! `reset`/`step` to an external decision-maker. Each step applies the
//! physical effects of the submitted actions (movement, pickup,
//! delivery, spawning), runs one [`World::tick`], and reads back an
//! observation and a reward.
//!
//! # Action encoding
//!
//! One integer per truck, trucks in id order:
//!
//! - `0`: stay.
//! - `k > 0`: move to the `(k - 1)`-th route neighbor of the current
//!   location, in graph order. Out of range is a stay.
//! - negative, or missing: stay.
//!
//! Invalid entries (out of range, negative, missing, surplus) are counted
//! in [`StepInfo::invalid_actions`], never reported as errors.

use haul_core::{Action, AgentId, IdAllocator, TickId, WorldError};
use haul_engine::{Agent, RoleKind, TaskStatus, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::config::{ConfigError, EnvConfig};
use crate::obs::{Observation, ObservationLayout};
use crate::scenario;

/// Stream used for placement and spawning. The world draws its
/// execution order from [`WORLD_STREAM`] of the same seed.
const ENV_STREAM: u64 = 0;
/// Stream used for the world's per-tick execution order.
const WORLD_STREAM: u64 = 1;

/// Decides whether an episode has reached its goal.
pub type GoalCondition = Box<dyn Fn(&World) -> bool + Send>;

// ── Step results ────────────────────────────────────────────────

/// Per-step counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// World tick after the step.
    pub tick: TickId,
    /// Tasks loaded this step.
    pub pickups: u32,
    /// Tasks delivered this step.
    pub deliveries: u32,
    /// Tasks spawned this step (0 or 1).
    pub spawned: u32,
    /// Action entries that resolved to an unrequested stay, plus surplus
    /// entries.
    pub invalid_actions: u32,
    /// Messages dropped during this step's tick.
    pub dropped_messages: u32,
}

/// Everything `step` returns.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Observation after the step.
    pub observation: Observation,
    /// Step cost plus delivery bonuses.
    pub reward: f64,
    /// The goal condition holds.
    pub terminated: bool,
    /// The horizon was reached.
    pub truncated: bool,
    /// Counters.
    pub info: StepInfo,
}

impl StepOutcome {
    /// `terminated || truncated`.
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Counters accumulated since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EpisodeStats {
    /// Steps taken.
    pub steps: u64,
    /// Sum of rewards.
    pub total_reward: f64,
    /// Tasks loaded.
    pub pickups: u64,
    /// Tasks delivered.
    pub deliveries: u64,
    /// Tasks spawned.
    pub spawned: u64,
    /// Invalid action entries.
    pub invalid_actions: u64,
}

impl EpisodeStats {
    fn record(&mut self, reward: f64, info: &StepInfo) {
        self.steps += 1;
        self.total_reward += reward;
        self.pickups += u64::from(info.pickups);
        self.deliveries += u64::from(info.deliveries);
        self.spawned += u64::from(info.spawned);
        self.invalid_actions += u64::from(info.invalid_actions);
    }
}

// ── LogisticsEnv ────────────────────────────────────────────────

/// Trucks, warehouses, and tasks on a ring, driven one step at a time.
pub struct LogisticsEnv {
    config: EnvConfig,
    world: World,
    rng: ChaCha8Rng,
    ids: IdAllocator,
    trucks: Vec<AgentId>,
    warehouses: Vec<AgentId>,
    layout: ObservationLayout,
    action_count: usize,
    seed: u64,
    stats: EpisodeStats,
    goal: Option<GoalCondition>,
}

impl LogisticsEnv {
    /// Validate `config` and build the initial scenario with seed 0.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (world, rng) = Self::seeded(0);
        let mut env = Self {
            config,
            world,
            rng,
            ids: IdAllocator::new(),
            trucks: Vec::new(),
            warehouses: Vec::new(),
            layout: ObservationLayout::default(),
            action_count: 1,
            seed: 0,
            stats: EpisodeStats::default(),
            goal: None,
        };
        env.reset(0);
        Ok(env)
    }

    /// Install a goal condition. Without one, `terminated` is always
    /// `false`.
    pub fn with_goal_condition<F>(mut self, goal: F) -> Self
    where
        F: Fn(&World) -> bool + Send + 'static,
    {
        self.goal = Some(Box::new(goal));
        self
    }

    /// Rebuild the scenario from `seed` and return the first observation.
    ///
    /// Episode statistics are cleared; the goal condition is kept.
    pub fn reset(&mut self, seed: u64) -> Observation {
        let (world, mut rng) = Self::seeded(seed);
        let built = scenario::build(&self.config, world, &mut rng);

        self.action_count = 1 + built
            .warehouses
            .iter()
            .map(|&w| built.world.route_neighbors(w).len())
            .max()
            .unwrap_or(0);
        self.layout = ObservationLayout::new(built.trucks.clone(), built.warehouses.clone());
        self.world = built.world;
        self.trucks = built.trucks;
        self.warehouses = built.warehouses;
        self.ids = built.ids;
        self.rng = rng;
        self.seed = seed;
        self.stats = EpisodeStats::default();

        debug!(
            seed,
            trucks = self.trucks.len(),
            warehouses = self.warehouses.len(),
            "environment reset"
        );
        self.observation()
    }

    /// Apply `actions`, run one world tick, and report the result.
    pub fn step(&mut self, actions: &[Action]) -> StepOutcome {
        let tick = self.world.tick_count().0;
        let mut reward = self.config.step_cost;
        let mut info = StepInfo::default();

        // 1. Movement, pickup, delivery, trucks in id order.
        if actions.len() > self.trucks.len() {
            let surplus = actions.len() - self.trucks.len();
            debug!(tick, surplus, "ignoring surplus actions");
            info.invalid_actions += surplus as u32;
        }
        let trucks = self.trucks.clone();
        for (i, &truck) in trucks.iter().enumerate() {
            if !self.apply_move(truck, actions.get(i).copied()) {
                info.invalid_actions += 1;
            }
            match self.load_or_unload(truck) {
                CargoEvent::PickedUp => info.pickups += 1,
                CargoEvent::Delivered => {
                    info.deliveries += 1;
                    reward += self.config.delivery_bonus;
                }
                CargoEvent::Idle => {}
            }
        }

        // 2. Spawn.
        if self.spawn_task() {
            info.spawned = 1;
        }

        // 3. Messages, perceive/decide/act.
        let report = self.world.tick();
        info.dropped_messages = report.dropped as u32;
        info.tick = self.world.tick_count();

        // 4. Read back.
        let observation = self.observation();
        let truncated = info.tick.0 >= self.config.horizon;
        let terminated = self.goal.as_ref().is_some_and(|goal| goal(&self.world));
        self.world.feedback(reward, terminated || truncated);
        self.stats.record(reward, &info);

        trace!(tick, reward, ?info, "step complete");
        StepOutcome {
            observation,
            reward,
            terminated,
            truncated,
            info,
        }
    }

    /// Move `truck` per `action`. Returns `false` for an invalid entry.
    fn apply_move(&mut self, truck: AgentId, action: Option<Action>) -> bool {
        let a = match action {
            Some(0) => return true,
            Some(a) if a > 0 => a,
            other => {
                debug!(%truck, action = ?other, "invalid action, staying");
                return false;
            }
        };
        let Some(location) = self.location_of(truck) else {
            debug!(%truck, a, "move without location, staying");
            return false;
        };
        let target = usize::try_from(a - 1)
            .ok()
            .and_then(|k| self.world.route_neighbors(location).get(k).copied());
        match target {
            Some(next) => {
                self.world
                    .relocate(truck, next)
                    .expect("route neighbors of a warehouse are live warehouses");
                trace!(%truck, from = %location, to = %next, "truck moved");
                true
            }
            None => {
                debug!(%truck, a, %location, "move out of range, staying");
                false
            }
        }
    }

    /// Pick up at the current location if empty, else deliver if the
    /// carried task is destined here.
    fn load_or_unload(&mut self, truck: AgentId) -> CargoEvent {
        let Some(location) = self.location_of(truck) else {
            return CargoEvent::Idle;
        };
        let carried = match self.world.agent(truck).and_then(Agent::as_truck) {
            Some(t) => t.cargo().first().copied(),
            None => return CargoEvent::Idle,
        };

        match carried {
            None => {
                let head = self
                    .world
                    .agent_mut(location)
                    .and_then(Agent::as_warehouse_mut)
                    .and_then(|w| w.take_head());
                let Some(task) = head else {
                    return CargoEvent::Idle;
                };
                if let Some(agent) = self.world.agent_mut(truck) {
                    agent
                        .load_cargo(task)
                        .expect("empty truck has room for one task");
                }
                if let Some(t) = self.world.agent_mut(task).and_then(Agent::as_task_mut) {
                    t.advance(TaskStatus::InTransit);
                }
                debug!(%truck, %task, at = %location, "picked up task");
                CargoEvent::PickedUp
            }
            Some(task) => {
                let destination = self
                    .world
                    .agent(task)
                    .and_then(Agent::as_task)
                    .map(|t| t.destination());
                if destination != Some(location) {
                    return CargoEvent::Idle;
                }
                if let Some(agent) = self.world.agent_mut(truck) {
                    agent.unload_cargo();
                }
                if let Some(t) = self.world.agent_mut(task).and_then(Agent::as_task_mut) {
                    t.advance(TaskStatus::Completed);
                }
                self.world
                    .remove_agent(task)
                    .expect("carried task is live");
                debug!(%truck, %task, at = %location, "delivered task");
                CargoEvent::Delivered
            }
        }
    }

    /// With `spawn_probability`, add one task between two distinct random
    /// warehouses. Needs at least two warehouses.
    fn spawn_task(&mut self) -> bool {
        let n = self.warehouses.len();
        if n < 2 || !self.rng.random_bool(self.config.spawn_probability) {
            return false;
        }
        let o = self.rng.random_range(0..n);
        let mut d = self.rng.random_range(0..n - 1);
        if d >= o {
            d += 1;
        }
        let (origin, destination) = (self.warehouses[o], self.warehouses[d]);

        let task = self.ids.allocate();
        self.world
            .add_agent(Agent::task(task, origin, destination, self.config.delivery_bonus))
            .expect("allocated ids are unique");
        if let Some(w) = self.world.agent_mut(origin).and_then(Agent::as_warehouse_mut) {
            w.push_task(task);
        }
        debug!(%task, %origin, %destination, "spawned task");
        true
    }

    fn location_of(&self, truck: AgentId) -> Option<AgentId> {
        self.world
            .agent(truck)
            .and_then(Agent::as_truck)
            .and_then(|t| t.location())
    }

    fn seeded(seed: u64) -> (World, ChaCha8Rng) {
        let mut env_rng = ChaCha8Rng::seed_from_u64(seed);
        env_rng.set_stream(ENV_STREAM);
        let mut world_rng = ChaCha8Rng::seed_from_u64(seed);
        world_rng.set_stream(WORLD_STREAM);
        (World::new(world_rng), env_rng)
    }

    /// Park `truck` at `warehouse`, overriding the seeded placement.
    ///
    /// Returns the previous location. Used to set up hand-placed
    /// scenarios after [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownAgent`] if `truck` is not one of this
    /// environment's trucks or `warehouse` is absent,
    /// [`WorldError::RoleMismatch`] if `warehouse` is not a warehouse.
    pub fn place_truck(
        &mut self,
        truck: AgentId,
        warehouse: AgentId,
    ) -> Result<Option<AgentId>, WorldError> {
        if !self.trucks.contains(&truck) {
            return Err(WorldError::UnknownAgent { id: truck });
        }
        let found = self
            .world
            .agent(warehouse)
            .ok_or(WorldError::UnknownAgent { id: warehouse })?
            .kind();
        if found != RoleKind::Warehouse {
            return Err(WorldError::RoleMismatch {
                id: warehouse,
                expected: RoleKind::Warehouse.name(),
                found: found.name(),
            });
        }
        let previous = self.world.relocate(truck, warehouse)?;
        debug!(%truck, %warehouse, "truck placed");
        Ok(previous)
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Current observation.
    pub fn observation(&self) -> Observation {
        self.layout.encode(&self.world)
    }

    /// Observation length, `2 * T + W`.
    pub fn observation_len(&self) -> usize {
        self.layout.len()
    }

    /// Discrete action-space size per truck: `1 + max route degree`.
    pub fn action_count(&self) -> usize {
        self.action_count
    }

    /// Read-only world access.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Truck ids, in action order.
    pub fn trucks(&self) -> &[AgentId] {
        &self.trucks
    }

    /// Warehouse ids, in observation order.
    pub fn warehouses(&self) -> &[AgentId] {
        &self.warehouses
    }

    /// The validated configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Seed of the current episode.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Counters since the last reset.
    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    /// Ids of tasks still waiting or in transit, ascending.
    pub fn open_tasks(&self) -> Vec<AgentId> {
        self.world.ids_of(RoleKind::Task)
    }
}

impl std::fmt::Debug for LogisticsEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogisticsEnv")
            .field("config", &self.config)
            .field("seed", &self.seed)
            .field("world", &self.world)
            .field("stats", &self.stats)
            .field("has_goal", &self.goal.is_some())
            .finish()
    }
}

enum CargoEvent {
    Idle,
    PickedUp,
    Delivered,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(t: usize, w: usize) -> LogisticsEnv {
        LogisticsEnv::new(EnvConfig::new(t, w).with_spawn_probability(0.0)).unwrap()
    }

    fn place(env: &mut LogisticsEnv, truck: AgentId, at: AgentId) {
        env.place_truck(truck, at).unwrap();
    }

    fn spawn_at(env: &mut LogisticsEnv, origin: AgentId, destination: AgentId) -> AgentId {
        let task = env.ids.allocate();
        env.world
            .add_agent(Agent::task(task, origin, destination, 10.0))
            .unwrap();
        env.world
            .agent_mut(origin)
            .unwrap()
            .as_warehouse_mut()
            .unwrap()
            .push_task(task);
        task
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert_eq!(
            LogisticsEnv::new(EnvConfig::new(1, 0)).unwrap_err(),
            ConfigError::NoWarehouses
        );
    }

    #[test]
    fn reset_sizes() {
        let mut e = env(2, 3);
        let obs = e.reset(1);
        assert_eq!(obs.len(), 7);
        assert_eq!(e.observation_len(), 7);
        assert_eq!(e.action_count(), 3);
        assert_eq!(e.world().tick_count(), TickId(0));
    }

    #[test]
    fn action_count_tracks_ring_degree() {
        assert_eq!(env(1, 1).action_count(), 1);
        assert_eq!(env(1, 2).action_count(), 2);
        assert_eq!(env(1, 5).action_count(), 3);
    }

    #[test]
    fn surplus_and_missing_actions_are_invalid() {
        let mut e = env(2, 3);
        e.reset(4);
        assert_eq!(e.step(&[0, 0, 1, 1]).info.invalid_actions, 2);
        assert_eq!(e.step(&[0]).info.invalid_actions, 1);
        assert_eq!(e.step(&[-3, 9]).info.invalid_actions, 2);
        assert_eq!(e.step(&[0, 0]).info.invalid_actions, 0);
        assert_eq!(e.stats().invalid_actions, 5);
    }

    #[test]
    fn pickup_then_delivery() {
        let mut e = env(1, 3);
        e.reset(0);
        let truck = e.trucks()[0];
        let (w0, w1) = (e.warehouses()[0], e.warehouses()[1]);
        place(&mut e, truck, w0);
        let task = spawn_at(&mut e, w0, w1);

        let out = e.step(&[0]);
        assert_eq!(out.info.pickups, 1);
        assert_eq!(out.reward, -0.01);
        assert_eq!(
            e.world().agent(task).unwrap().as_task().unwrap().status(),
            TaskStatus::InTransit
        );
        assert!(e.world().agent(w0).unwrap().as_warehouse().unwrap().is_empty());

        // w1 is the first route neighbor of w0 in a 3-ring.
        assert_eq!(e.world().route_neighbors(w0)[0], w1);
        let out = e.step(&[1]);
        assert_eq!(out.info.deliveries, 1);
        assert!((out.reward - 9.99).abs() < 1e-12);
        assert!(e.world().agent(task).is_none());
        assert!(e.world().agent(truck).unwrap().as_truck().unwrap().cargo().is_empty());
        assert_eq!(e.stats().deliveries, 1);
    }

    #[test]
    fn no_delivery_away_from_destination() {
        let mut e = env(1, 3);
        e.reset(0);
        let truck = e.trucks()[0];
        let (w0, w2) = (e.warehouses()[0], e.warehouses()[2]);
        place(&mut e, truck, w0);
        spawn_at(&mut e, w0, w2);
        e.step(&[0]);
        // w1 is not the destination.
        let out = e.step(&[1]);
        assert_eq!(out.info.deliveries, 0);
        assert_eq!(out.reward, -0.01);
    }

    #[test]
    fn removed_task_is_never_picked_up() {
        let mut e = env(1, 3);
        e.reset(0);
        let truck = e.trucks()[0];
        let (w0, w1) = (e.warehouses()[0], e.warehouses()[1]);
        place(&mut e, truck, w0);
        let task = spawn_at(&mut e, w0, w1);
        e.world.remove_agent(task).unwrap();

        let out = e.step(&[0]);
        assert_eq!(out.info.pickups, 0);
        assert!(e.world().agent(truck).unwrap().as_truck().unwrap().cargo().is_empty());
        assert!(e.world().agent(w0).unwrap().as_warehouse().unwrap().is_empty());
    }

    #[test]
    fn place_truck_checks_roles() {
        let mut e = env(2, 3);
        e.reset(0);
        let (t0, t1) = (e.trucks()[0], e.trucks()[1]);
        let w2 = e.warehouses()[2];
        assert!(matches!(
            e.place_truck(t0, t1),
            Err(WorldError::RoleMismatch { .. })
        ));
        assert_eq!(
            e.place_truck(w2, w2),
            Err(WorldError::UnknownAgent { id: w2 })
        );
        e.place_truck(t0, w2).unwrap();
        assert_eq!(e.place_truck(t0, w2), Ok(Some(w2)));
        e.world().check_invariants().unwrap();
    }

    #[test]
    fn spawn_probability_one_always_spawns() {
        let mut e =
            LogisticsEnv::new(EnvConfig::new(0, 3).with_spawn_probability(1.0)).unwrap();
        e.reset(2);
        for _ in 0..5 {
            assert_eq!(e.step(&[]).info.spawned, 1);
        }
        assert_eq!(e.open_tasks().len(), 5);
        for task in e.open_tasks() {
            let t = e.world().agent(task).unwrap().as_task().unwrap();
            assert_ne!(t.origin(), t.destination());
        }
    }

    #[test]
    fn single_warehouse_never_spawns() {
        let mut e =
            LogisticsEnv::new(EnvConfig::new(1, 1).with_spawn_probability(1.0)).unwrap();
        e.reset(0);
        assert_eq!(e.step(&[0]).info.spawned, 0);
    }

    #[test]
    fn truncates_at_horizon() {
        let mut e = LogisticsEnv::new(EnvConfig::new(1, 2).with_horizon(3)).unwrap();
        e.reset(0);
        assert!(!e.step(&[0]).truncated);
        assert!(!e.step(&[0]).truncated);
        let last = e.step(&[0]);
        assert!(last.truncated);
        assert!(!last.terminated);
        assert!(last.done());
    }

    #[test]
    fn goal_condition_drives_terminated() {
        let mut e = env(1, 2).with_goal_condition(|w: &World| w.tick_count().0 >= 2);
        e.reset(0);
        assert!(!e.step(&[0]).terminated);
        assert!(e.step(&[0]).terminated);
    }

    #[test]
    fn reset_clears_stats_and_tasks() {
        let mut e =
            LogisticsEnv::new(EnvConfig::new(1, 3).with_spawn_probability(1.0)).unwrap();
        e.reset(0);
        e.step(&[0]);
        assert_eq!(e.stats().steps, 1);
        e.reset(0);
        assert_eq!(*e.stats(), EpisodeStats::default());
        assert!(e.open_tasks().is_empty());
        assert_eq!(e.seed(), 0);
    }
}
