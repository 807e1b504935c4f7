//! Agent-local state values.

use indexmap::IndexMap;

use crate::id::AgentId;

/// An opaque discrete action returned by an agent's decide step.
///
/// The kernel never interprets actions; it only collects them per agent
/// per tick.
pub type Action = i64;

/// A single value in an agent's local state map.
#[derive(Clone, Debug, PartialEq)]
pub enum StateValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Free-form text.
    Text(String),
    /// Another agent.
    Id(AgentId),
    /// An ordered list of agents.
    Ids(Vec<AgentId>),
    /// The actions returned by a decision provider.
    Actions(Vec<Action>),
}

impl StateValue {
    /// The contained id, if this is an [`Id`](StateValue::Id).
    pub fn as_id(&self) -> Option<AgentId> {
        match self {
            Self::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// The contained ids, if this is an [`Ids`](StateValue::Ids).
    pub fn as_ids(&self) -> Option<&[AgentId]> {
        match self {
            Self::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    /// The contained integer, if this is an [`Int`](StateValue::Int).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// An agent's local state: string keys in insertion order.
///
/// Insertion order is preserved so that two runs with the same seed
/// produce identical state exports.
pub type AgentState = IndexMap<String, StateValue>;
