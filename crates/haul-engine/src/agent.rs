//! Agents and their role variants.
//!
//! An [`Agent`] is a closed enum of behaviours ([`Role`]) wrapped in the
//! common plumbing every role shares: a local state map, an inbox filled
//! by the world at the start of each tick, an outbox drained by the world
//! after decide, and an optional [`DecisionProvider`].
//!
//! # Capability contract
//!
//! - [`perceive`](Agent::perceive) reads a [`WorldView`] and writes only
//!   the agent's own `state`.
//! - [`decide`](Agent::decide) drains and processes the inbox, may push
//!   outgoing messages, then delegates to the provider if one is
//!   attached. It does not touch `state`; anything it wants to remember is
//!   scheduled as an [`Effect`].
//! - [`act`](Agent::act) commits the scheduled effects.

use std::collections::VecDeque;
use std::fmt;

use haul_core::{
    Action, AgentId, AgentState, Message, MessageKind, Outgoing, Payload, StateValue, WorldError,
};

use crate::provider::DecisionProvider;
use crate::view::WorldView;

/// State key: the truck's current location.
pub const STATE_LOCATION: &str = "location";
/// State key: route neighbors of the truck's location.
pub const STATE_NEIGHBORS: &str = "neighbors";
/// State key: the most recent task offered to a truck.
pub const STATE_OFFERED_TASK: &str = "offered_task";
/// State key: total messages processed by the agent.
pub const STATE_RECEIVED: &str = "received";
/// State key: actions returned by the provider on the latest decide.
pub const STATE_LAST_ACTIONS: &str = "last_actions";

// ── Role payloads ───────────────────────────────────────────────

/// A vehicle that carries tasks between warehouses.
#[derive(Clone, Debug, PartialEq)]
pub struct Truck {
    capacity: usize,
    cargo: Vec<AgentId>,
    location: Option<AgentId>,
}

impl Truck {
    /// An empty, unplaced truck.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cargo: Vec::with_capacity(capacity),
            location: None,
        }
    }

    /// Maximum number of tasks carried at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Carried tasks, oldest first.
    pub fn cargo(&self) -> &[AgentId] {
        &self.cargo
    }

    /// The node the truck occupies.
    pub fn location(&self) -> Option<AgentId> {
        self.location
    }

    /// Whether another task fits.
    pub fn has_room(&self) -> bool {
        self.cargo.len() < self.capacity
    }

    pub(crate) fn set_location(&mut self, location: Option<AgentId>) -> Option<AgentId> {
        std::mem::replace(&mut self.location, location)
    }
}

/// A node that stores waiting tasks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Warehouse {
    inventory: VecDeque<AgentId>,
}

impl Warehouse {
    /// An empty warehouse.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waiting tasks, head first.
    pub fn inventory(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.inventory.iter().copied()
    }

    /// The task a truck would pick up next.
    pub fn head(&self) -> Option<AgentId> {
        self.inventory.front().copied()
    }

    /// Number of waiting tasks.
    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    /// Whether no task is waiting.
    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    /// Queue a task at the tail.
    pub fn push_task(&mut self, task: AgentId) {
        self.inventory.push_back(task);
    }

    /// Remove and return the head task.
    pub fn take_head(&mut self) -> Option<AgentId> {
        self.inventory.pop_front()
    }

    /// Drop a task wherever it sits. Returns whether it was present.
    pub fn remove_task(&mut self, task: AgentId) -> bool {
        match self.inventory.iter().position(|&t| t == task) {
            Some(i) => {
                self.inventory.remove(i);
                true
            }
            None => false,
        }
    }
}

/// Lifecycle of a task. Only moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskStatus {
    /// In a warehouse inventory.
    Waiting,
    /// In a truck's cargo.
    InTransit,
    /// Delivered; the task is about to leave the world.
    Completed,
}

impl TaskStatus {
    /// Whether `next` is the one legal successor of `self`.
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Waiting, TaskStatus::InTransit)
                | (TaskStatus::InTransit, TaskStatus::Completed)
        )
    }
}

/// A delivery job from one node to another.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    origin: AgentId,
    destination: AgentId,
    reward: f64,
    status: TaskStatus,
}

impl Task {
    /// A waiting task.
    pub fn new(origin: AgentId, destination: AgentId, reward: f64) -> Self {
        Self {
            origin,
            destination,
            reward,
            status: TaskStatus::Waiting,
        }
    }

    /// Where the task was spawned.
    pub fn origin(&self) -> AgentId {
        self.origin
    }

    /// Where it must be delivered.
    pub fn destination(&self) -> AgentId {
        self.destination
    }

    /// Nominal reward for delivering it.
    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// Current status.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Move to the next status.
    ///
    /// # Panics
    ///
    /// Panics if `next` is not the successor of the current status.
    /// Backward or skipped transitions are kernel bugs.
    pub fn advance(&mut self, next: TaskStatus) {
        assert!(
            self.status.can_advance_to(next),
            "illegal task transition {:?} -> {next:?}",
            self.status
        );
        self.status = next;
    }
}

// ── Role ────────────────────────────────────────────────────────

/// Role tag without payload, stored on graph nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleKind {
    /// [`Role::Generic`].
    Generic,
    /// [`Role::Truck`].
    Truck,
    /// [`Role::Warehouse`].
    Warehouse,
    /// [`Role::Task`].
    Task,
}

impl RoleKind {
    /// Lowercase name for errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            RoleKind::Generic => "generic",
            RoleKind::Truck => "truck",
            RoleKind::Warehouse => "warehouse",
            RoleKind::Task => "task",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behavioural variant of an agent.
#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    /// No role-specific behaviour.
    Generic,
    /// See [`Truck`].
    Truck(Truck),
    /// See [`Warehouse`].
    Warehouse(Warehouse),
    /// See [`Task`].
    Task(Task),
}

impl Role {
    /// The payload-free tag.
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Generic => RoleKind::Generic,
            Role::Truck(_) => RoleKind::Truck,
            Role::Warehouse(_) => RoleKind::Warehouse,
            Role::Task(_) => RoleKind::Task,
        }
    }
}

/// A state change scheduled during decide and committed by act.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Insert or overwrite a state entry.
    Set(&'static str, StateValue),
}

// ── Agent ───────────────────────────────────────────────────────

/// A behavioural unit living on the world graph.
pub struct Agent {
    id: AgentId,
    role: Role,
    state: AgentState,
    inbox: Vec<Message>,
    outbox: Vec<Outgoing>,
    last_received: Vec<Message>,
    scheduled: Vec<Effect>,
    provider: Option<Box<dyn DecisionProvider>>,
}

impl Agent {
    /// An agent with the given role and empty state.
    pub fn new(id: AgentId, role: Role) -> Self {
        Self {
            id,
            role,
            state: AgentState::new(),
            inbox: Vec::new(),
            outbox: Vec::new(),
            last_received: Vec::new(),
            scheduled: Vec::new(),
            provider: None,
        }
    }

    /// A [`Role::Generic`] agent.
    pub fn generic(id: AgentId) -> Self {
        Self::new(id, Role::Generic)
    }

    /// An unplaced, empty truck.
    pub fn truck(id: AgentId, capacity: usize) -> Self {
        Self::new(id, Role::Truck(Truck::new(capacity)))
    }

    /// An empty warehouse.
    pub fn warehouse(id: AgentId) -> Self {
        Self::new(id, Role::Warehouse(Warehouse::new()))
    }

    /// A waiting task.
    pub fn task(id: AgentId, origin: AgentId, destination: AgentId, reward: f64) -> Self {
        Self::new(id, Role::Task(Task::new(origin, destination, reward)))
    }

    /// Attach a decision provider.
    pub fn with_provider(mut self, provider: Box<dyn DecisionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace (or remove) the decision provider, returning the old one.
    pub fn set_provider(
        &mut self,
        provider: Option<Box<dyn DecisionProvider>>,
    ) -> Option<Box<dyn DecisionProvider>> {
        std::mem::replace(&mut self.provider, provider)
    }

    /// Whether a decision provider is attached.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// This agent's id.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Role payload.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Role tag.
    pub fn kind(&self) -> RoleKind {
        self.role.kind()
    }

    /// Local state.
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Messages delivered this tick and not yet processed.
    pub fn inbox(&self) -> &[Message] {
        &self.inbox
    }

    /// Messages queued by this agent and not yet collected by the world.
    pub fn outbox(&self) -> &[Outgoing] {
        &self.outbox
    }

    /// Messages consumed by the most recent decide.
    pub fn last_received(&self) -> &[Message] {
        &self.last_received
    }

    /// Queue a message. It enters the channel when the world next drains
    /// this agent's outbox and reaches the receiver one tick later.
    pub fn send(&mut self, receiver: AgentId, kind: MessageKind, payload: Payload) {
        self.outbox.push(Outgoing::new(receiver, kind, payload));
    }

    /// Truck payload, if this is a truck.
    pub fn as_truck(&self) -> Option<&Truck> {
        match &self.role {
            Role::Truck(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn as_truck_mut(&mut self) -> Option<&mut Truck> {
        match &mut self.role {
            Role::Truck(t) => Some(t),
            _ => None,
        }
    }

    /// Warehouse payload, if this is a warehouse.
    pub fn as_warehouse(&self) -> Option<&Warehouse> {
        match &self.role {
            Role::Warehouse(w) => Some(w),
            _ => None,
        }
    }

    /// Mutable warehouse payload, if this is a warehouse.
    pub fn as_warehouse_mut(&mut self) -> Option<&mut Warehouse> {
        match &mut self.role {
            Role::Warehouse(w) => Some(w),
            _ => None,
        }
    }

    /// Task payload, if this is a task.
    pub fn as_task(&self) -> Option<&Task> {
        match &self.role {
            Role::Task(t) => Some(t),
            _ => None,
        }
    }

    /// Mutable task payload, if this is a task.
    pub fn as_task_mut(&mut self) -> Option<&mut Task> {
        match &mut self.role {
            Role::Task(t) => Some(t),
            _ => None,
        }
    }

    /// Put a task into this truck's cargo.
    ///
    /// # Errors
    ///
    /// [`WorldError::RoleMismatch`] if this is not a truck,
    /// [`WorldError::CargoFull`] if the truck is at capacity.
    pub fn load_cargo(&mut self, task: AgentId) -> Result<(), WorldError> {
        let id = self.id;
        let found = self.kind().name();
        let truck = self.as_truck_mut().ok_or(WorldError::RoleMismatch {
            id,
            expected: RoleKind::Truck.name(),
            found,
        })?;
        if !truck.has_room() {
            return Err(WorldError::CargoFull {
                id,
                capacity: truck.capacity,
            });
        }
        truck.cargo.push(task);
        debug_assert!(truck.cargo.len() <= truck.capacity);
        Ok(())
    }

    /// Remove and return the oldest cargo item. `None` for non-trucks and
    /// empty trucks.
    pub fn unload_cargo(&mut self) -> Option<AgentId> {
        let truck = self.as_truck_mut()?;
        if truck.cargo.is_empty() {
            None
        } else {
            Some(truck.cargo.remove(0))
        }
    }

    // ── Tick protocol hooks (driven by World) ───────────────────

    pub(crate) fn receive(&mut self, message: Message) {
        self.inbox.push(message);
    }

    pub(crate) fn take_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn clear_location_if(&mut self, node: AgentId) -> bool {
        match self.as_truck_mut() {
            Some(t) if t.location == Some(node) => {
                t.location = None;
                true
            }
            _ => false,
        }
    }

    /// Drop every reference to `task` from inventory or cargo.
    pub(crate) fn forget_task(&mut self, task: AgentId) -> bool {
        match &mut self.role {
            Role::Warehouse(w) => w.remove_task(task),
            Role::Truck(t) => {
                let before = t.cargo.len();
                t.cargo.retain(|&c| c != task);
                t.cargo.len() != before
            }
            _ => false,
        }
    }

    pub(crate) fn provider_mut(&mut self) -> Option<&mut (dyn DecisionProvider + 'static)> {
        self.provider.as_deref_mut()
    }

    /// Refresh local state from the world.
    pub fn perceive(&mut self, view: &WorldView<'_>) {
        if let Role::Truck(truck) = &self.role {
            match truck.location {
                Some(loc) => {
                    self.state
                        .insert(STATE_LOCATION.to_string(), StateValue::Id(loc));
                    self.state.insert(
                        STATE_NEIGHBORS.to_string(),
                        StateValue::Ids(view.route_neighbors(loc).to_vec()),
                    );
                }
                None => {
                    self.state.shift_remove(STATE_LOCATION);
                    self.state.shift_remove(STATE_NEIGHBORS);
                }
            }
        }
    }

    /// Process the inbox, queue replies, and ask the provider for actions.
    pub fn decide(&mut self, view: &WorldView<'_>) -> Vec<Action> {
        let inbox = std::mem::take(&mut self.inbox);

        match &self.role {
            Role::Generic | Role::Task(_) => {}
            Role::Warehouse(warehouse) => {
                for msg in inbox.iter().filter(|m| m.is_task_query()) {
                    if let Some(head) = warehouse.head() {
                        self.outbox.push(Outgoing::new(
                            msg.sender,
                            MessageKind::Bid,
                            Payload::TaskOffer(head),
                        ));
                    }
                }
            }
            Role::Truck(truck) => {
                if let Some(task) = inbox.iter().rev().find_map(Message::offered_task) {
                    self.scheduled
                        .push(Effect::Set(STATE_OFFERED_TASK, StateValue::Id(task)));
                }
                if truck.cargo.is_empty() {
                    if let Some(loc) = truck.location {
                        self.outbox.push(Outgoing::new(
                            loc,
                            MessageKind::Ask,
                            Payload::TaskQuery,
                        ));
                    }
                }
            }
        }

        if !inbox.is_empty() {
            let seen = self
                .state
                .get(STATE_RECEIVED)
                .and_then(StateValue::as_int)
                .unwrap_or(0);
            self.scheduled.push(Effect::Set(
                STATE_RECEIVED,
                StateValue::Int(seen + inbox.len() as i64),
            ));
        }
        self.last_received = inbox;

        match self.provider.as_mut() {
            Some(provider) => {
                let actions = provider.decide(&self.state, view);
                self.scheduled.push(Effect::Set(
                    STATE_LAST_ACTIONS,
                    StateValue::Actions(actions.clone()),
                ));
                actions
            }
            None => Vec::new(),
        }
    }

    /// Commit effects scheduled during decide.
    pub fn act(&mut self) {
        for effect in self.scheduled.drain(..) {
            match effect {
                Effect::Set(key, value) => {
                    self.state.insert(key.to_string(), value);
                }
            }
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("inbox", &self.inbox.len())
            .field("outbox", &self.outbox.len())
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}
