//! Core types for the Haul simulation kernel.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! identifiers, message envelope, agent state values, and error types
//! shared by the engine and the environment adapter.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod message;
pub mod state;

pub use error::WorldError;
pub use id::{AgentId, IdAllocator, MessageId, TickId};
pub use message::{Message, MessageKind, Outgoing, Payload};
pub use state::{Action, AgentState, StateValue};
