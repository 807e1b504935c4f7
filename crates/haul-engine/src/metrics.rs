//! Cumulative counters for a world.
//!
//! [`WorldMetrics`] is read by external metrics collaborators; the
//! kernel never exports it anywhere itself.

/// Counters accumulated over a world's lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldMetrics {
    /// Ticks executed.
    pub ticks: u64,
    /// Messages that entered the channel.
    pub messages_sent: u64,
    /// Messages placed into a live receiver's inbox.
    pub messages_delivered: u64,
    /// Messages whose receiver was gone at delivery time.
    pub messages_dropped: u64,
    /// Successful `add_agent` calls.
    pub agents_added: u64,
    /// Successful `remove_agent` calls.
    pub agents_removed: u64,
}
