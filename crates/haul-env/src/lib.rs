//! Logistics environment adapter for Haul.
//!
//! Wraps a [`haul_engine::World`] in an observe/act loop: a ring of
//! warehouses, trucks that move along it, and tasks that spawn at random
//! and pay a bonus on delivery. See [`LogisticsEnv`] for the step
//! protocol and action encoding.
//!
//! All randomness comes from ChaCha8 streams derived from the seed passed
//! to [`LogisticsEnv::reset`], so a seed plus an action sequence replays
//! an episode exactly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod env;
pub mod heuristic;
pub mod obs;
pub mod scenario;

pub use config::{ConfigError, EnvConfig};
pub use env::{EpisodeStats, GoalCondition, LogisticsEnv, StepInfo, StepOutcome};
pub use heuristic::RandomWalk;
pub use obs::{Observation, ObservationLayout};
pub use scenario::Scenario;
