//! Integration tests: the reference scenario, reward accounting, and
//! determinism of full episodes.

use haul_core::{AgentId, TickId};
use haul_env::{EnvConfig, LogisticsEnv, RandomWalk, StepOutcome};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────

fn location(env: &LogisticsEnv, truck: AgentId) -> Option<AgentId> {
    env.world()
        .agent(truck)
        .and_then(|a| a.as_truck())
        .and_then(|t| t.location())
}

fn run(seed: u64, steps: usize) -> (Vec<StepOutcome>, LogisticsEnv) {
    let mut env = LogisticsEnv::new(EnvConfig::new(3, 5).with_spawn_probability(0.3)).unwrap();
    env.reset(seed);
    let mut walk = RandomWalk::new(seed);
    let mut outcomes = Vec::with_capacity(steps);
    for _ in 0..steps {
        let actions = walk.actions(&env);
        outcomes.push(env.step(&actions));
    }
    (outcomes, env)
}

// ── Reference scenario ──────────────────────────────────────────

#[test]
fn two_trucks_three_warehouses_seed_one() {
    let mut env = LogisticsEnv::new(EnvConfig::new(2, 3)).unwrap();
    let obs = env.reset(1);
    assert_eq!(obs.len(), 2 * 2 + 3);

    // Ring A-B-C-A is ids 0-1-2; trucks follow as 3 and 4.
    let (a, b, c) = (AgentId(0), AgentId(1), AgentId(2));
    assert_eq!(env.warehouses(), &[a, b, c]);
    assert_eq!(env.trucks(), &[AgentId(3), AgentId(4)]);
    let (t0, t1) = (AgentId(3), AgentId(4));

    // Seed 1 parks both trucks on B.
    assert_eq!(location(&env, t0), Some(b));
    assert_eq!(location(&env, t1), Some(b));

    env.place_truck(t0, a).unwrap();
    env.place_truck(t1, b).unwrap();
    assert_eq!(env.world().route_neighbors(a).as_slice(), &[b, c]);

    let out = env.step(&[1, 0]);
    assert_eq!(location(&env, t0), Some(b));
    assert_eq!(location(&env, t1), Some(b));
    assert_eq!(out.reward, -0.01);
    assert_eq!(out.info.tick, TickId(1));
    assert_eq!(env.world().tick_count(), TickId(1));
    assert_eq!(out.info.invalid_actions, 0);
    assert_eq!(out.info.pickups, 0);
    assert!(!out.terminated);
    assert!(!out.truncated);

    // Truck 0's fingerprint is B's rank: (1 + 1) / 3.
    assert_eq!(out.observation[1], 2.0 / 3.0);
}

// ── Reward accounting ───────────────────────────────────────────

#[test]
fn every_bonus_matches_one_delivery() {
    let (outcomes, env) = run(11, 400);
    let bonus = env.config().delivery_bonus;
    let step_cost = env.config().step_cost;
    let mut delivered = 0;
    for out in &outcomes {
        let expected = step_cost + bonus * f64::from(out.info.deliveries);
        assert!((out.reward - expected).abs() < 1e-9);
        delivered += u64::from(out.info.deliveries);
    }
    assert_eq!(env.stats().deliveries, delivered);
    // Completed tasks leave the world; the rest are still open.
    assert_eq!(
        env.stats().spawned,
        delivered + env.open_tasks().len() as u64
    );
}

#[test]
fn truncation_after_horizon_steps() {
    let (outcomes, _) = run(5, 200);
    assert!(outcomes[..199].iter().all(|o| !o.truncated));
    assert!(outcomes[199].truncated);
}

// ── Determinism ─────────────────────────────────────────────────

#[test]
fn same_seed_same_episode() {
    let (a, env_a) = run(42, 300);
    let (b, env_b) = run(42, 300);
    assert_eq!(a, b);
    assert_eq!(env_a.world().export(), env_b.world().export());
    assert_eq!(env_a.stats(), env_b.stats());
}

#[test]
fn reset_replays_the_episode() {
    let mut env = LogisticsEnv::new(EnvConfig::new(2, 4).with_spawn_probability(0.5)).unwrap();
    let actions: Vec<Vec<i64>> = (0..60).map(|i| vec![i % 3, (i + 1) % 3]).collect();

    let first_obs = env.reset(9);
    let first: Vec<_> = actions.iter().map(|a| env.step(a)).collect();
    let first_export = env.world().export();

    assert_eq!(env.reset(9), first_obs);
    let second: Vec<_> = actions.iter().map(|a| env.step(a)).collect();
    assert_eq!(first, second);
    assert_eq!(env.world().export(), first_export);
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn invariants_hold_under_any_actions(
        seed in any::<u64>(),
        capacity in 1usize..3,
        steps in prop::collection::vec(prop::collection::vec(-2i64..5, 0..5), 1..60),
    ) {
        let config = EnvConfig::new(3, 4)
            .with_truck_capacity(capacity)
            .with_spawn_probability(0.5);
        let mut env = LogisticsEnv::new(config).unwrap();
        env.reset(seed);
        for actions in &steps {
            let out = env.step(actions);
            prop_assert_eq!(out.observation.len(), env.observation_len());
            prop_assert!(env.world().check_invariants().is_ok());
            for &t in env.trucks() {
                let truck = env.world().agent(t).unwrap().as_truck().unwrap();
                prop_assert!(truck.cargo().len() <= truck.capacity());
                prop_assert!(truck.location().is_some());
            }
        }
    }
}
