//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an agent within a world.
///
/// Ids are opaque and stable for the agent's lifetime. Scenario builders
/// allocate them from a monotonic counter, so ordering by id is the same
/// as ordering by creation. Nothing in the kernel hashes ids into
/// observations; where a numeric encoding is needed, the rank of the id in
/// a sorted list is used instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a message that entered a world's channel.
///
/// Assigned by the world when it drains an agent's outbox, so ids are
/// monotonic in send order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg#{}", self.0)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented at the end of every `World::tick()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Hands out [`AgentId`]s in increasing order.
///
/// Owned by whoever builds a scenario; never process-global, so two
/// scenarios built from the same seed get the same ids.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Start allocating at `AgentId(0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> AgentId {
        AgentId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_is_monotonic() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!(a, AgentId(0));
        assert_eq!(b, AgentId(1));
        assert!(a < b);
        assert_eq!(ids.peek(), AgentId(2));
    }

    #[test]
    fn tick_next_increments() {
        assert_eq!(TickId(4).next(), TickId(5));
    }

    #[test]
    fn display_formats() {
        assert_eq!(AgentId(7).to_string(), "agent#7");
        assert_eq!(MessageId(3).to_string(), "msg#3");
        assert_eq!(TickId(12).to_string(), "12");
    }
}
