//! Condition/effect event dispatch
//!
//! An [`EventHandler`] is a registry of (condition, effect) pairs polled once
//! per frame: each pass evaluates every connected condition in ascending
//! connection order and fires the paired effect for those that return true.
//! There is no payload and no subscription by topic; conditions are arbitrary
//! predicates over the world and frame context, which is what lets input
//! polling, timers, and game state all share one dispatch path.
//!
//! Propagation is driven by [`World::propagate`]: entries are lifted out of
//! the registry one at a time while their closures run, so effects are free
//! to connect and disconnect pairs (including the running one) without
//! invalidating the pass. Pairs connected during a pass first fire on the
//! next pass; pairs disconnected during a pass no longer fire in it.
//!
//! [`World::propagate`]: crate::world::World::propagate

use std::collections::BTreeMap;
use std::fmt;

use crate::context::Context;
use crate::world::World;

/// Predicate half of a connection, polled every propagation pass
pub type Condition = Box<dyn FnMut(&World, &Context<'_>) -> bool>;

/// Action half of a connection, fired when its condition holds
pub type Effect = Box<dyn FnMut(&mut World, &mut Context<'_>)>;

/// Handle identifying one registered (condition, effect) pair.
///
/// Ids are handed out in strictly increasing order per handler and never
/// reused, so iteration order is first-connected-fires-first. The handle
/// carries no teardown logic; dropping it changes nothing, and
/// [`EventHandler::disconnect`] is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection#{}", self.0)
    }
}

pub(crate) struct EventEntry {
    pub(crate) condition: Condition,
    pub(crate) effect: Effect,
}

/// Registry of condition/effect pairs evaluated once per frame
#[derive(Default)]
pub struct EventHandler {
    entries: BTreeMap<ConnectionId, EventEntry>,
    next_id: u64,
    evaluating: Option<ConnectionId>,
    evaluating_disconnected: bool,
}

impl EventHandler {
    /// Create an empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a condition/effect pair.
    ///
    /// Nothing is evaluated at connect time; the pair first runs during the
    /// next propagation pass after registration.
    pub fn connect<C, E>(&mut self, condition: C, effect: E) -> ConnectionId
    where
        C: FnMut(&World, &Context<'_>) -> bool + 'static,
        E: FnMut(&mut World, &mut Context<'_>) + 'static,
    {
        self.connect_boxed(Box::new(condition), Box::new(effect))
    }

    /// Register an already-boxed condition/effect pair.
    ///
    /// Useful with the input predicate factories, which hand out boxed
    /// conditions ready to pass here.
    pub fn connect_boxed(&mut self, condition: Condition, effect: Effect) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, EventEntry { condition, effect });
        id
    }

    /// Remove a pair from all future evaluation. Idempotent.
    ///
    /// Disconnecting the pair whose effect is currently running prevents it
    /// from being re-registered when the effect returns.
    pub fn disconnect(&mut self, id: ConnectionId) {
        if self.evaluating == Some(id) {
            self.evaluating_disconnected = true;
            return;
        }
        self.entries.remove(&id);
    }

    /// Whether the pair is still registered
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        if self.evaluating == Some(id) {
            return !self.evaluating_disconnected;
        }
        self.entries.contains_key(&id)
    }

    /// Number of registered pairs
    pub fn len(&self) -> usize {
        let lifted = usize::from(self.evaluating.is_some() && !self.evaluating_disconnected);
        self.entries.len() + lifted
    }

    /// Whether no pairs are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all currently registered pairs in ascending order
    pub(crate) fn snapshot_ids(&self) -> Vec<ConnectionId> {
        self.entries.keys().copied().collect()
    }

    /// Lift an entry out for evaluation; `None` if it was disconnected since
    /// the snapshot was taken
    pub(crate) fn begin_evaluation(&mut self, id: ConnectionId) -> Option<EventEntry> {
        let entry = self.entries.remove(&id)?;
        self.evaluating = Some(id);
        self.evaluating_disconnected = false;
        Some(entry)
    }

    /// Return a lifted entry to the registry, unless it disconnected itself
    /// while running
    pub(crate) fn finish_evaluation(&mut self, id: ConnectionId, entry: EventEntry) {
        let survived = !self.evaluating_disconnected;
        self.evaluating = None;
        self.evaluating_disconnected = false;
        if survived {
            self.entries.insert(id, entry);
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("connections", &self.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
