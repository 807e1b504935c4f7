//! Entity graph store and the per-tick protocol.
//!
//! [`World`] owns every agent, the undirected graph connecting them, the
//! message channel, the tick counter, and the RNG that fixes each tick's
//! execution order.
//!
//! # Tick protocol
//!
//! 1. Drain the channel into receivers' inboxes. Messages for agents that
//!    no longer exist are dropped and counted.
//! 2. Shuffle the live agent ids with the injected RNG.
//! 3. In that order: perceive, decide, collect actions, drain the outbox
//!    into the channel stamped with the current tick.
//! 4. In the same order: act.
//! 5. Advance the tick counter.
//!
//! Decide and act never interleave, and messages sent in step 3 are not
//! delivered until step 1 of the next tick, which gives exactly one tick
//! of latency.
//!
//! # Ownership
//!
//! The world is exclusively owned by its driver. Agents are reachable
//! mutably only through [`World::agent_mut`], which never exposes the
//! graph, so the node/agent bijection cannot be broken from outside.

use haul_core::{Action, AgentId, Message, MessageId, TickId, WorldError};
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::agent::{Agent, Role, RoleKind};
use crate::channel::MessageChannel;
use crate::graph::{Edge, EdgeKind, Graph, Neighbors};
use crate::metrics::WorldMetrics;
use crate::view::WorldView;

// Compile-time assertion: World is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<World>();
    }
};

// ── Reports and exports ─────────────────────────────────────────

/// Summary returned by [`World::get_state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldState {
    /// Ticks executed so far.
    pub tick: TickId,
    /// Live agents.
    pub agent_count: usize,
    /// Undirected edges.
    pub edge_count: usize,
}

/// What happened during one [`World::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// The tick that was executed (the counter value before increment).
    pub tick: TickId,
    /// Execution order used for both phases.
    pub order: Vec<AgentId>,
    /// Actions returned by each agent's decide, in execution order.
    pub actions: IndexMap<AgentId, Vec<Action>>,
    /// Messages placed into inboxes at the start of the tick.
    pub delivered: usize,
    /// Messages dropped because their receiver was gone.
    pub dropped: usize,
    /// Messages collected from outboxes during decide.
    pub sent: usize,
}

/// Value copy of one agent, for exports.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Agent id.
    pub id: AgentId,
    /// Role and its payload.
    pub role: Role,
    /// Local state.
    pub state: haul_core::AgentState,
}

/// Value copy of a whole world.
///
/// Two worlds driven by the same seed and inputs produce equal exports.
/// Also the hand-off format for visualization collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldExport {
    /// Ticks executed so far.
    pub tick: TickId,
    /// Agents in insertion order.
    pub agents: Vec<AgentSnapshot>,
    /// Edges as `(lower id, higher id, edge)`.
    pub edges: Vec<(AgentId, AgentId, Edge)>,
    /// Messages waiting for the next delivery.
    pub pending: Vec<Message>,
}

// ── World ───────────────────────────────────────────────────────

/// The entity graph store.
pub struct World {
    agents: IndexMap<AgentId, Agent>,
    graph: Graph,
    channel: MessageChannel,
    tick: TickId,
    next_message_id: u64,
    rng: ChaCha8Rng,
    metrics: WorldMetrics,
}

impl World {
    /// An empty world drawing its execution order from `rng`.
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            agents: IndexMap::new(),
            graph: Graph::new(),
            channel: MessageChannel::new(),
            tick: TickId(0),
            next_message_id: 0,
            rng,
            metrics: WorldMetrics::default(),
        }
    }

    /// An empty world with a ChaCha8 stream seeded from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Register an agent and its isolated graph node.
    ///
    /// # Errors
    ///
    /// [`WorldError::DuplicateId`] if the id is live. The existing agent is
    /// untouched.
    pub fn add_agent(&mut self, agent: Agent) -> Result<(), WorldError> {
        let id = agent.id();
        if self.agents.contains_key(&id) {
            return Err(WorldError::DuplicateId { id });
        }
        self.graph.add_node(id, agent.kind());
        self.agents.insert(id, agent);
        self.metrics.agents_added += 1;
        trace!(%id, "agent added");
        Ok(())
    }

    /// Remove an agent, its node, and every incident edge.
    ///
    /// Trucks parked at the removed node lose their location. A removed
    /// task leaves every warehouse inventory and truck cargo. Pending
    /// messages addressed to it stay queued and are dropped on delivery.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownAgent`] if `id` is not live. Absence is always
    /// reported; callers that do not care may ignore it.
    pub fn remove_agent(&mut self, id: AgentId) -> Result<Agent, WorldError> {
        let agent = self
            .agents
            .shift_remove(&id)
            .ok_or(WorldError::UnknownAgent { id })?;
        let edges = self.graph.remove_node(id).unwrap_or(0);
        let is_task = agent.kind() == RoleKind::Task;
        for other in self.agents.values_mut() {
            if other.clear_location_if(id) {
                debug!(truck = %other.id(), node = %id, "location removed under truck");
            }
            if is_task && other.forget_task(id) {
                debug!(holder = %other.id(), task = %id, "removed task dropped from holder");
            }
        }
        self.metrics.agents_removed += 1;
        trace!(%id, edges, "agent removed");
        Ok(agent)
    }

    /// Add or update a route edge between two live agents.
    ///
    /// A pair holds at most one edge. Overwriting an occupancy edge
    /// unparks the truck it belonged to.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownAgent`] naming the first missing endpoint;
    /// [`WorldError::SelfLoop`] if `a == b`.
    pub fn connect_agents(&mut self, a: AgentId, b: AgentId, weight: f64) -> Result<(), WorldError> {
        self.require(a)?;
        self.require(b)?;
        if a == b {
            return Err(WorldError::SelfLoop { id: a });
        }
        self.unpark(a, b);
        self.graph.set_edge(a, b, Edge::route(weight));
        Ok(())
    }

    /// Remove the edge between two live agents. Returns whether it existed.
    ///
    /// Removing an occupancy edge unparks its truck.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownAgent`] naming the first missing endpoint.
    pub fn disconnect_agents(&mut self, a: AgentId, b: AgentId) -> Result<bool, WorldError> {
        self.require(a)?;
        self.require(b)?;
        self.unpark(a, b);
        Ok(self.graph.remove_edge(a, b).is_some())
    }

    /// Move a truck to `node`, swapping its occupancy edge.
    ///
    /// Returns the previous location. Relocating to the current location
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownAgent`] if either id is absent,
    /// [`WorldError::SelfLoop`] if `node == truck`,
    /// [`WorldError::RoleMismatch`] if `truck` is not a truck or `node` is
    /// one, [`WorldError::RouteConflict`] if the two already share a
    /// route edge. Nothing changes on error.
    pub fn relocate(&mut self, truck: AgentId, node: AgentId) -> Result<Option<AgentId>, WorldError> {
        self.require(node)?;
        if truck == node {
            return Err(WorldError::SelfLoop { id: truck });
        }
        if self.graph.kind(node) == Some(RoleKind::Truck) {
            return Err(WorldError::RoleMismatch {
                id: node,
                expected: "location",
                found: RoleKind::Truck.name(),
            });
        }
        let agent = self
            .agents
            .get_mut(&truck)
            .ok_or(WorldError::UnknownAgent { id: truck })?;
        let found = agent.kind().name();
        let t = agent.as_truck_mut().ok_or(WorldError::RoleMismatch {
            id: truck,
            expected: RoleKind::Truck.name(),
            found,
        })?;

        if t.location() == Some(node) {
            return Ok(Some(node));
        }
        if self.graph.edge(truck, node).map(|e| e.kind) == Some(EdgeKind::Route) {
            return Err(WorldError::RouteConflict { truck, node });
        }

        let previous = t.set_location(Some(node));
        if let Some(old) = previous {
            if self.graph.edge(truck, old).map(|e| e.kind) == Some(EdgeKind::Occupancy) {
                self.graph.remove_edge(truck, old);
            }
        }
        self.graph.set_edge(truck, node, Edge::occupancy());
        trace!(%truck, from = ?previous, to = %node, "truck relocated");
        Ok(previous)
    }

    // ── Tick ────────────────────────────────────────────────────

    /// Run one tick of the protocol described in the module docs.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.tick;

        // 1. Delivery.
        let mut delivered = 0;
        let mut dropped = 0;
        for msg in self.channel.deliver() {
            match self.agents.get_mut(&msg.receiver) {
                Some(receiver) => {
                    receiver.receive(msg);
                    delivered += 1;
                }
                None => {
                    debug!(
                        tick = tick.0,
                        message = %msg.id,
                        sender = %msg.sender,
                        receiver = %msg.receiver,
                        "dropped message for missing receiver"
                    );
                    dropped += 1;
                }
            }
        }

        // 2. Execution order.
        let mut order: Vec<AgentId> = self.agents.keys().copied().collect();
        order.shuffle(&mut self.rng);

        // 3. Perceive + decide.
        let view = WorldView::new(&self.graph, tick);
        let mut actions = IndexMap::with_capacity(order.len());
        let mut sent = 0;
        for &id in &order {
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            agent.perceive(&view);
            let chosen = agent.decide(&view);
            for out in agent.take_outbox() {
                let msg = Message::stamp(MessageId(self.next_message_id), id, out, tick);
                self.next_message_id += 1;
                self.channel.send(msg);
                sent += 1;
            }
            actions.insert(id, chosen);
        }

        // 4. Act.
        for id in &order {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.act();
            }
        }

        // 5. Advance.
        self.tick = tick.next();
        self.metrics.ticks += 1;
        self.metrics.messages_sent += sent as u64;
        self.metrics.messages_delivered += delivered as u64;
        self.metrics.messages_dropped += dropped as u64;
        debug_assert!(self.check_invariants().is_ok(), "{:?}", self.check_invariants());
        trace!(tick = tick.0, agents = order.len(), delivered, dropped, sent, "tick complete");

        TickReport {
            tick,
            order,
            actions,
            delivered,
            dropped,
            sent,
        }
    }

    /// Forward environment feedback to every attached provider, in id
    /// order.
    pub fn feedback(&mut self, reward: f64, done: bool) {
        let mut ids: Vec<AgentId> = self.agents.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(provider) = self.agents.get_mut(&id).and_then(Agent::provider_mut) {
                provider.update(reward, done);
            }
        }
    }

    // ── Read access ─────────────────────────────────────────────

    /// `{tick, agent_count, edge_count}`.
    pub fn get_state(&self) -> WorldState {
        WorldState {
            tick: self.tick,
            agent_count: self.agents.len(),
            edge_count: self.graph.edge_count(),
        }
    }

    /// Ticks executed so far.
    pub fn tick_count(&self) -> TickId {
        self.tick
    }

    /// A live agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// A live agent, mutably. Used by drivers to queue messages, attach
    /// providers, or edit role payloads between ticks.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Whether `id` is live.
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Live agents in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    /// Ids of live agents with the given role, sorted.
    pub fn ids_of(&self, kind: RoleKind) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.kind() == kind)
            .map(Agent::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Every edge once.
    pub fn edges(&self) -> impl Iterator<Item = (AgentId, AgentId, Edge)> + '_ {
        self.graph.edges()
    }

    /// All neighbors of `id`, in graph order.
    pub fn neighbors(&self, id: AgentId) -> Neighbors {
        self.graph.neighbors(id)
    }

    /// Route neighbors of `id`, in graph order.
    pub fn route_neighbors(&self, id: AgentId) -> Neighbors {
        self.graph.neighbors_by(id, EdgeKind::Route)
    }

    /// The graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// A read-only view at the current tick.
    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(&self.graph, self.tick)
    }

    /// Messages waiting for the next delivery.
    pub fn pending_messages(&self) -> &[Message] {
        self.channel.peek()
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &WorldMetrics {
        &self.metrics
    }

    /// Value copy of the whole world.
    pub fn export(&self) -> WorldExport {
        WorldExport {
            tick: self.tick,
            agents: self
                .agents
                .values()
                .map(|a| AgentSnapshot {
                    id: a.id(),
                    role: a.role().clone(),
                    state: a.state().clone(),
                })
                .collect(),
            edges: self.graph.edges().collect(),
            pending: self.channel.peek().to_vec(),
        }
    }

    /// Check the structural invariants.
    ///
    /// - every agent has a node with the matching role, and vice versa;
    /// - every edge joins two live agents;
    /// - no truck carries more than its capacity;
    /// - a truck's location is live and mirrored by an occupancy edge;
    /// - every occupancy edge joins a truck to its location.
    ///
    /// Run after every tick in debug builds.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.agents.len() != self.graph.node_count() {
            return Err(format!(
                "{} agents but {} graph nodes",
                self.agents.len(),
                self.graph.node_count()
            ));
        }
        for (id, agent) in &self.agents {
            if self.graph.kind(*id) != Some(agent.kind()) {
                return Err(format!("agent {id} has no matching graph node"));
            }
            if let Some(truck) = agent.as_truck() {
                if truck.cargo().len() > truck.capacity() {
                    return Err(format!(
                        "truck {id} carries {} > capacity {}",
                        truck.cargo().len(),
                        truck.capacity()
                    ));
                }
                if let Some(loc) = truck.location() {
                    if self.graph.edge(*id, loc).map(|e| e.kind) != Some(EdgeKind::Occupancy) {
                        return Err(format!("truck {id} at {loc} without occupancy edge"));
                    }
                }
            }
        }
        for (a, b, edge) in self.graph.edges() {
            if !self.agents.contains_key(&a) || !self.agents.contains_key(&b) {
                return Err(format!("edge {a}-{b} has a dead endpoint"));
            }
            if edge.kind == EdgeKind::Occupancy && !self.parked(a, b) && !self.parked(b, a) {
                return Err(format!("occupancy edge {a}-{b} has no parked truck"));
            }
        }
        Ok(())
    }

    /// Clear the location of a truck whose occupancy edge is `a`-`b`.
    fn unpark(&mut self, a: AgentId, b: AgentId) {
        if self.graph.edge(a, b).map(|e| e.kind) != Some(EdgeKind::Occupancy) {
            return;
        }
        for (truck, node) in [(a, b), (b, a)] {
            if let Some(agent) = self.agents.get_mut(&truck) {
                if agent.clear_location_if(node) {
                    debug!(%truck, %node, "occupancy edge replaced, truck unparked");
                }
            }
        }
    }

    fn parked(&self, truck: AgentId, node: AgentId) -> bool {
        self.agents
            .get(&truck)
            .and_then(Agent::as_truck)
            .is_some_and(|t| t.location() == Some(node))
    }

    fn require(&self, id: AgentId) -> Result<(), WorldError> {
        if self.agents.contains_key(&id) {
            Ok(())
        } else {
            Err(WorldError::UnknownAgent { id })
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("agents", &self.agents.len())
            .field("edges", &self.graph.edge_count())
            .field("pending", &self.channel.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haul_core::{MessageKind, Payload, StateValue};

    fn two_agents() -> World {
        let mut w = World::with_seed(1);
        w.add_agent(Agent::generic(AgentId(1))).unwrap();
        w.add_agent(Agent::generic(AgentId(2))).unwrap();
        w
    }

    #[test]
    fn add_agent_creates_isolated_node() {
        let w = two_agents();
        let s = w.get_state();
        assert_eq!(s.agent_count, 2);
        assert_eq!(s.edge_count, 0);
        assert_eq!(s.tick, TickId(0));
        assert!(w.neighbors(AgentId(1)).is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected_and_existing_kept() {
        let mut w = World::with_seed(1);
        w.add_agent(Agent::warehouse(AgentId(1))).unwrap();
        let err = w.add_agent(Agent::generic(AgentId(1))).unwrap_err();
        assert_eq!(err, WorldError::DuplicateId { id: AgentId(1) });
        assert_eq!(w.agent(AgentId(1)).unwrap().kind(), RoleKind::Warehouse);
        assert_eq!(w.get_state().agent_count, 1);
    }

    #[test]
    fn connect_unknown_agent_is_an_error() {
        let mut w = two_agents();
        assert_eq!(
            w.connect_agents(AgentId(1), AgentId(9), 1.0),
            Err(WorldError::UnknownAgent { id: AgentId(9) })
        );
        assert_eq!(
            w.connect_agents(AgentId(1), AgentId(1), 1.0),
            Err(WorldError::SelfLoop { id: AgentId(1) })
        );
        assert_eq!(w.get_state().edge_count, 0);
    }

    #[test]
    fn remove_agent_drops_edges() {
        let mut w = two_agents();
        w.add_agent(Agent::generic(AgentId(3))).unwrap();
        w.connect_agents(AgentId(1), AgentId(2), 1.0).unwrap();
        w.connect_agents(AgentId(2), AgentId(3), 1.0).unwrap();
        let removed = w.remove_agent(AgentId(2)).unwrap();
        assert_eq!(removed.id(), AgentId(2));
        assert_eq!(w.get_state().edge_count, 0);
        assert_eq!(w.get_state().agent_count, 2);
        w.check_invariants().unwrap();
    }

    #[test]
    fn remove_missing_agent_reports_unknown() {
        let mut w = two_agents();
        assert!(matches!(
            w.remove_agent(AgentId(7)),
            Err(WorldError::UnknownAgent { id: AgentId(7) })
        ));
    }

    #[test]
    fn disconnect_reports_existence() {
        let mut w = two_agents();
        w.connect_agents(AgentId(1), AgentId(2), 2.0).unwrap();
        assert_eq!(w.disconnect_agents(AgentId(2), AgentId(1)), Ok(true));
        assert_eq!(w.disconnect_agents(AgentId(2), AgentId(1)), Ok(false));
    }

    #[test]
    fn relocate_swaps_occupancy_edge() {
        let mut w = World::with_seed(1);
        w.add_agent(Agent::warehouse(AgentId(0))).unwrap();
        w.add_agent(Agent::warehouse(AgentId(1))).unwrap();
        w.add_agent(Agent::truck(AgentId(5), 1)).unwrap();
        w.connect_agents(AgentId(0), AgentId(1), 1.0).unwrap();

        assert_eq!(w.relocate(AgentId(5), AgentId(0)), Ok(None));
        assert_eq!(w.get_state().edge_count, 2);
        assert_eq!(w.relocate(AgentId(5), AgentId(1)), Ok(Some(AgentId(0))));
        assert_eq!(w.get_state().edge_count, 2);
        assert!(w.graph().edge(AgentId(5), AgentId(0)).is_none());
        assert_eq!(
            w.graph().edge(AgentId(5), AgentId(1)).map(|e| e.kind),
            Some(EdgeKind::Occupancy)
        );
        // Occupancy edges are not routes.
        assert_eq!(w.route_neighbors(AgentId(1)).as_slice(), &[AgentId(0)]);
        w.check_invariants().unwrap();
    }

    #[test]
    fn relocate_onto_route_neighbor_keeps_the_route() {
        let mut w = World::with_seed(1);
        w.add_agent(Agent::warehouse(AgentId(0))).unwrap();
        w.add_agent(Agent::warehouse(AgentId(1))).unwrap();
        w.add_agent(Agent::truck(AgentId(2), 1)).unwrap();
        w.connect_agents(AgentId(2), AgentId(0), 3.0).unwrap();

        assert_eq!(
            w.relocate(AgentId(2), AgentId(0)),
            Err(WorldError::RouteConflict {
                truck: AgentId(2),
                node: AgentId(0)
            })
        );
        assert_eq!(w.agent(AgentId(2)).unwrap().as_truck().unwrap().location(), None);
        assert_eq!(w.relocate(AgentId(2), AgentId(1)), Ok(None));

        let edges: Vec<_> = w.edges().map(|(a, b, e)| (a, b, e.kind, e.weight)).collect();
        assert_eq!(
            edges,
            vec![
                (AgentId(0), AgentId(2), EdgeKind::Route, 3.0),
                (AgentId(1), AgentId(2), EdgeKind::Occupancy, 1.0),
            ]
        );
        w.check_invariants().unwrap();
    }

    #[test]
    fn relocate_non_truck_is_role_mismatch() {
        let mut w = two_agents();
        assert!(matches!(
            w.relocate(AgentId(1), AgentId(2)),
            Err(WorldError::RoleMismatch { .. })
        ));
    }

    #[test]
    fn removing_location_clears_truck() {
        let mut w = World::with_seed(1);
        w.add_agent(Agent::warehouse(AgentId(0))).unwrap();
        w.add_agent(Agent::truck(AgentId(5), 1)).unwrap();
        w.relocate(AgentId(5), AgentId(0)).unwrap();
        w.remove_agent(AgentId(0)).unwrap();
        assert_eq!(w.agent(AgentId(5)).unwrap().as_truck().unwrap().location(), None);
        w.check_invariants().unwrap();
    }

    #[test]
    fn removing_task_clears_inventory_and_cargo() {
        let mut w = World::with_seed(1);
        w.add_agent(Agent::warehouse(AgentId(0))).unwrap();
        w.add_agent(Agent::warehouse(AgentId(1))).unwrap();
        w.add_agent(Agent::truck(AgentId(2), 2)).unwrap();
        w.add_agent(Agent::task(AgentId(5), AgentId(0), AgentId(1), 1.0))
            .unwrap();
        w.add_agent(Agent::task(AgentId(6), AgentId(0), AgentId(1), 1.0))
            .unwrap();
        {
            let wh = w.agent_mut(AgentId(0)).unwrap().as_warehouse_mut().unwrap();
            wh.push_task(AgentId(5));
            wh.push_task(AgentId(6));
        }
        let truck = w.agent_mut(AgentId(2)).unwrap();
        truck.load_cargo(AgentId(5)).unwrap();
        truck.load_cargo(AgentId(6)).unwrap();

        w.remove_agent(AgentId(5)).unwrap();

        let inventory: Vec<_> = w
            .agent(AgentId(0))
            .unwrap()
            .as_warehouse()
            .unwrap()
            .inventory()
            .collect();
        assert_eq!(inventory, vec![AgentId(6)]);
        assert_eq!(
            w.agent(AgentId(2)).unwrap().as_truck().unwrap().cargo(),
            &[AgentId(6)]
        );
        w.check_invariants().unwrap();
    }

    #[test]
    fn stray_occupancy_edge_fails_invariants() {
        let mut w = World::with_seed(1);
        w.add_agent(Agent::warehouse(AgentId(0))).unwrap();
        w.add_agent(Agent::truck(AgentId(1), 1)).unwrap();
        w.graph.set_edge(AgentId(0), AgentId(1), Edge::occupancy());
        let err = w.check_invariants().unwrap_err();
        assert!(err.contains("no parked truck"), "{err}");

        w.graph.remove_edge(AgentId(0), AgentId(1));
        w.relocate(AgentId(1), AgentId(0)).unwrap();
        w.check_invariants().unwrap();
    }

    #[test]
    fn tick_advances_counter_and_reports_order() {
        let mut w = two_agents();
        let report = w.tick();
        assert_eq!(report.tick, TickId(0));
        assert_eq!(w.tick_count(), TickId(1));
        let mut order = report.order.clone();
        order.sort();
        assert_eq!(order, vec![AgentId(1), AgentId(2)]);
        assert_eq!(report.actions.len(), 2);
    }

    #[test]
    fn message_sent_before_tick_arrives_one_tick_later() {
        let mut w = two_agents();
        w.agent_mut(AgentId(1))
            .unwrap()
            .send(AgentId(2), MessageKind::Info, Payload::Text("Hello".into()));

        // Tick 0 collects the outbox into the channel.
        let r0 = w.tick();
        assert_eq!(r0.sent, 1);
        assert_eq!(r0.delivered, 0);
        assert!(w.agent(AgentId(2)).unwrap().last_received().is_empty());
        assert_eq!(w.pending_messages().len(), 1);
        assert_eq!(w.pending_messages()[0].enqueued_tick, TickId(0));

        // Tick 1 delivers and the receiver consumes it.
        let r1 = w.tick();
        assert_eq!(r1.delivered, 1);
        let got = w.agent(AgentId(2)).unwrap().last_received();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].payload, Payload::Text("Hello".into()));
        assert_eq!(got[0].sender, AgentId(1));
        assert_eq!(
            w.agent(AgentId(2)).unwrap().state().get("received"),
            Some(&StateValue::Int(1))
        );

        // And never again.
        w.tick();
        assert!(w.agent(AgentId(2)).unwrap().last_received().is_empty());
    }

    #[test]
    fn message_to_removed_agent_is_dropped() {
        let mut w = two_agents();
        w.agent_mut(AgentId(1))
            .unwrap()
            .send(AgentId(2), MessageKind::Info, Payload::Empty);
        w.tick();
        w.remove_agent(AgentId(2)).unwrap();
        let report = w.tick();
        assert_eq!(report.dropped, 1);
        assert_eq!(w.metrics().messages_dropped, 1);
    }

    #[test]
    fn same_seed_same_order() {
        let build = || {
            let mut w = World::with_seed(99);
            for i in 0..16 {
                w.add_agent(Agent::generic(AgentId(i))).unwrap();
            }
            w
        };
        let mut a = build();
        let mut b = build();
        for _ in 0..10 {
            assert_eq!(a.tick().order, b.tick().order);
        }
    }

    #[test]
    fn debug_impl_summarizes() {
        let w = two_agents();
        let s = format!("{w:?}");
        assert!(s.contains("World"));
        assert!(s.contains("agents: 2"));
    }
}
