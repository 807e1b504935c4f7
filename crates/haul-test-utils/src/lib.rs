//! Test utilities and mock providers for Haul development.
//!
//! Provides deterministic [`DecisionProvider`] fixtures and small world
//! builders shared by the engine and environment test suites.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    line_world, ring_world, FeedbackLog, RecordingProvider, ScriptedProvider,
};
