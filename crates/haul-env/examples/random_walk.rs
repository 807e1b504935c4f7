//! Random-walk episode driver.
//!
//! Demonstrates: config → LogisticsEnv → reset → step with a scripted
//! action source → read rewards and stats.
//!
//! Run with `RUST_LOG=haul_env=debug` to see pickups and deliveries.

use haul_env::{EnvConfig, LogisticsEnv, RandomWalk};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Haul Random Walk ===\n");

    let config = EnvConfig::new(2, 3).with_spawn_probability(0.2);
    let mut env = LogisticsEnv::new(config).unwrap();

    for episode in 0..3u64 {
        let obs = env.reset(episode);
        let mut walk = RandomWalk::new(episode);
        println!("Episode {episode}: obs_len={}, actions={}", obs.len(), env.action_count());

        loop {
            let actions = walk.actions(&env);
            let out = env.step(&actions);
            if out.info.deliveries > 0 {
                println!(
                    "  tick {:>3}: delivered {}, reward={:+.2}",
                    out.info.tick.0, out.info.deliveries, out.reward
                );
            }
            if out.done() {
                break;
            }
        }

        let stats = env.stats();
        println!(
            "  steps={} total_reward={:.2} pickups={} deliveries={} spawned={}\n",
            stats.steps, stats.total_reward, stats.pickups, stats.deliveries, stats.spawned
        );
    }
}
