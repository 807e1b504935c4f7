//! Simulation kernel for Haul.
//!
//! Provides the [`World`] entity graph store and its per-tick protocol,
//! the one-tick-delayed [`MessageChannel`], the [`Agent`] type with its
//! closed set of [`Role`] variants, and the [`DecisionProvider`] contract
//! through which external policies plug in.
//!
//! Everything here is single-threaded and synchronous. The only
//! randomness is the per-tick execution order, drawn from a seeded
//! `ChaCha8Rng` injected at construction.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod channel;
pub mod graph;
pub mod metrics;
pub mod provider;
pub mod view;
pub mod world;

pub use agent::{Agent, Effect, Role, RoleKind, Task, TaskStatus, Truck, Warehouse};
pub use channel::MessageChannel;
pub use graph::{Edge, EdgeKind, Graph, Neighbors};
pub use metrics::WorldMetrics;
pub use provider::{DecisionProvider, RandomProvider, RuleProvider};
pub use view::WorldView;
pub use world::{AgentSnapshot, TickReport, World, WorldExport, WorldState};
