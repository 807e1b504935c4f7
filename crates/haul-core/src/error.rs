//! Error types for the Haul simulation kernel.
//!
//! Only the graph-store operations can fail. Dropped messages and
//! out-of-range actions are recoverable and surface as counters, not
//! errors.

use std::error::Error;
use std::fmt;

use crate::id::AgentId;

/// Errors from entity graph store operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// `add_agent` was called with an id that is already live.
    DuplicateId {
        /// The id that already exists.
        id: AgentId,
    },
    /// An operation referenced an id with no live agent.
    UnknownAgent {
        /// The missing id.
        id: AgentId,
    },
    /// `connect_agents` was asked to join an agent to itself.
    SelfLoop {
        /// The agent on both ends.
        id: AgentId,
    },
    /// A role-specific operation was applied to an agent of another role.
    RoleMismatch {
        /// The agent that was targeted.
        id: AgentId,
        /// The role the operation requires.
        expected: &'static str,
        /// The role the agent actually has.
        found: &'static str,
    },
    /// A truck was asked to park on a node it already shares a route
    /// edge with. A pair holds one edge and routes are never replaced by
    /// occupancy.
    RouteConflict {
        /// The truck.
        truck: AgentId,
        /// The node it was sent to.
        node: AgentId,
    },
    /// A truck was asked to load cargo beyond its capacity.
    CargoFull {
        /// The truck.
        id: AgentId,
        /// Its capacity.
        capacity: usize,
    },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "agent {id} already exists"),
            Self::UnknownAgent { id } => write!(f, "agent {id} does not exist"),
            Self::SelfLoop { id } => write!(f, "cannot connect agent {id} to itself"),
            Self::RoleMismatch {
                id,
                expected,
                found,
            } => write!(f, "agent {id} is a {found}, expected a {expected}"),
            Self::RouteConflict { truck, node } => {
                write!(f, "truck {truck} has a route edge to {node} and cannot park there")
            }
            Self::CargoFull { id, capacity } => {
                write!(f, "truck {id} is full (capacity {capacity})")
            }
        }
    }
}

impl Error for WorldError {}
