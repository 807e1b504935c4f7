//! Haul: a tick-based multi-agent logistics simulation kernel.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Haul sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use haul::prelude::*;
//!
//! let mut env = LogisticsEnv::new(EnvConfig::new(2, 3)).unwrap();
//! let obs = env.reset(1);
//! assert_eq!(obs.len(), 2 * 2 + 3);
//!
//! let out = env.step(&[1, 0]);
//! assert_eq!(out.reward, -0.01);
//! assert_eq!(out.info.tick, TickId(1));
//! ```
//!
//! Driving a [`engine::World`] directly:
//!
//! ```rust
//! use haul::prelude::*;
//!
//! let mut world = World::with_seed(7);
//! world.add_agent(Agent::generic(AgentId(0))).unwrap();
//! world.add_agent(Agent::generic(AgentId(1))).unwrap();
//! world.connect_agents(AgentId(0), AgentId(1), 1.0).unwrap();
//!
//! world
//!     .agent_mut(AgentId(0))
//!     .unwrap()
//!     .send(AgentId(1), MessageKind::Info, Payload::Text("Hello".into()));
//! world.tick();
//! world.tick();
//! assert_eq!(world.agent(AgentId(1)).unwrap().last_received().len(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `haul-core` | IDs, messages, state values, kernel errors |
//! | [`engine`] | `haul-engine` | World, graph, channel, agents, providers |
//! | [`env`] | `haul-env` | Logistics environment adapter |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`haul-core`).
pub use haul_core as types;

/// Simulation kernel (`haul-engine`).
///
/// [`engine::World`] is the entity graph store; [`engine::DecisionProvider`]
/// is the extension point for external policies.
pub use haul_engine as engine;

/// Logistics environment adapter (`haul-env`).
pub use haul_env as env;

/// Common imports for typical Haul usage.
///
/// ```rust
/// use haul::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use haul_core::{
        Action, AgentId, AgentState, Message, MessageKind, Payload, StateValue, TickId,
    };

    // Errors
    pub use haul_core::WorldError;
    pub use haul_env::ConfigError;

    // Engine
    pub use haul_engine::{
        Agent, DecisionProvider, RandomProvider, Role, RoleKind, RuleProvider, World, WorldView,
    };

    // Environment
    pub use haul_env::{EnvConfig, LogisticsEnv, Observation, RandomWalk, StepOutcome};
}
