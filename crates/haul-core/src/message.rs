//! Messages exchanged between agents.
//!
//! Agents never build a full [`Message`] themselves. They push an
//! [`Outgoing`] into their outbox and the world stamps it with an id, the
//! sender, and the tick it was enqueued on when it drains the outbox.

use crate::id::{AgentId, MessageId, TickId};

/// The communicative intent of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Unsolicited information.
    Info,
    /// A question; warehouses answer `Ask` + [`Payload::TaskQuery`].
    Ask,
    /// An offer made in reply to an `Ask`.
    Bid,
    /// A request for service.
    Request,
    /// A counter-offer.
    Negotiate,
    /// Acceptance of a bid or request.
    Accept,
    /// Rejection of a bid or request.
    Reject,
}

/// Message content.
///
/// The kernel only interprets [`TaskQuery`](Payload::TaskQuery) and
/// [`TaskOffer`](Payload::TaskOffer); everything else is carried through
/// untouched for decision providers and external collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// No content.
    Empty,
    /// Free-form text.
    Text(String),
    /// A single number.
    Scalar(f64),
    /// "Are there tasks available here?"
    TaskQuery,
    /// "This task is available here."
    TaskOffer(AgentId),
}

/// A message waiting in an agent's outbox.
#[derive(Clone, Debug, PartialEq)]
pub struct Outgoing {
    /// Intended recipient.
    pub receiver: AgentId,
    /// Intent.
    pub kind: MessageKind,
    /// Content.
    pub payload: Payload,
}

impl Outgoing {
    /// Build an outgoing message.
    pub fn new(receiver: AgentId, kind: MessageKind, payload: Payload) -> Self {
        Self {
            receiver,
            kind,
            payload,
        }
    }
}

/// A message that has entered a world's channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Unique within the owning world.
    pub id: MessageId,
    /// The agent whose outbox it came from.
    pub sender: AgentId,
    /// The agent whose inbox it is headed for.
    pub receiver: AgentId,
    /// Intent.
    pub kind: MessageKind,
    /// Content.
    pub payload: Payload,
    /// The tick during which the sender's outbox was drained.
    pub enqueued_tick: TickId,
}

impl Message {
    /// Stamp an [`Outgoing`] into a channel message.
    pub fn stamp(id: MessageId, sender: AgentId, out: Outgoing, enqueued_tick: TickId) -> Self {
        Self {
            id,
            sender,
            receiver: out.receiver,
            kind: out.kind,
            payload: out.payload,
            enqueued_tick,
        }
    }

    /// Whether this is a warehouse task query.
    pub fn is_task_query(&self) -> bool {
        self.kind == MessageKind::Ask && self.payload == Payload::TaskQuery
    }

    /// The offered task, if this is a task bid.
    pub fn offered_task(&self) -> Option<AgentId> {
        match (self.kind, &self.payload) {
            (MessageKind::Bid, Payload::TaskOffer(task)) => Some(*task),
            _ => None,
        }
    }
}
