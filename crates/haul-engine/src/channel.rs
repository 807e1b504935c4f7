//! One-tick-delayed message channel.
//!
//! The channel is a single FIFO shared by every agent in a world. Agents'
//! outboxes are drained into it during the decide phase of tick N, and
//! the whole queue is drained into receivers' inboxes at the start of
//! tick N+1. Delivery is channel-wide: `deliver()` hands back every
//! pending message regardless of receiver.

use haul_core::Message;

/// FIFO mailbox queue with whole-queue delivery.
#[derive(Clone, Debug, Default)]
pub struct MessageChannel {
    queue: Vec<Message>,
    total_sent: u64,
}

impl MessageChannel {
    /// An empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the queue.
    pub fn send(&mut self, message: Message) {
        self.queue.push(message);
        self.total_sent += 1;
    }

    /// Return and clear every pending message, in enqueue order.
    pub fn deliver(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.queue)
    }

    /// Number of messages waiting for the next delivery.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending messages, in enqueue order.
    pub fn peek(&self) -> &[Message] {
        &self.queue
    }

    /// Messages sent over the channel's lifetime.
    pub fn total_sent(&self) -> u64 {
        self.total_sent
    }
}
