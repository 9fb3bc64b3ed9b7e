//! Worlds: entity containers with a deferred-mutation frame protocol
//!
//! A [`World`] is one screen of the game: it owns an ordered list of entity
//! ids, a camera frame, and an event handler. Entities themselves live in
//! the engine's [`Entities`] arena; the world only sequences them.
//!
//! Structural changes are deferred to defined points in the frame so that
//! game code never mutates a collection it is being called out of. Spawned
//! and inserted entities wait in a staging list and join the live order at
//! the end of [`update`]; removal is a flag honored during cleanup; cross
//! world moves queue until the update pass is out of its iteration. The
//! result is that behaviors and event effects may freely spawn, remove, and
//! move entities at any time.
//!
//! [`update`]: World::update

use log::warn;
use slotmap::new_key_type;
use thiserror::Error;

use crate::context::Context;
use crate::entity::{Behavior, Entities, EntityDef, EntityId};
use crate::events::{Condition, ConnectionId, Effect, EventHandler};
use crate::geometry::{FrameError, FrameId, FrameTree};
use crate::graphics::Canvas;

new_key_type! {
    /// Handle to a world in the engine's world arena
    pub struct WorldId;
}

/// Errors from world entity operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorldError {
    /// An entity handle no longer refers to a live entity
    #[error("unknown entity handle")]
    UnknownEntity,

    /// The entity is already in a world and cannot be inserted again
    #[error("entity is already in a world")]
    EntityAlreadyAdded,

    /// The operation needs the entity to be in a world, but it is detached
    #[error("entity does not belong to a world")]
    EntityHasNoWorld,

    /// The entity belongs to a world other than the one operated on
    #[error("entity belongs to a different world")]
    NotInThisWorld,

    /// A coordinate frame lookup or resolution failed
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// An ordered collection of entities with a camera, an event handler, and a
/// deferred-mutation update protocol.
///
/// Construct worlds through [`Engine::make_world`] or stage them with
/// [`Requests::push_world`]; both paths assign the world its id. A world
/// built with [`World::new`] and never handed to an engine keeps the null
/// id, which is fine as long as it is the only world in play.
///
/// [`Engine::make_world`]: crate::engine::Engine::make_world
/// [`Requests::push_world`]: crate::context::Requests::push_world
pub struct World {
    pub(crate) id: WorldId,
    order: Vec<EntityId>,
    staged: Vec<EntityId>,
    moves: Vec<(WorldId, EntityId)>,
    root: FrameId,
    camera: FrameId,
    events: EventHandler,
    updating: bool,
}

impl World {
    /// Create an empty world with its own root frame and a camera under it
    #[must_use]
    pub fn new(frames: &mut FrameTree) -> Self {
        let root = frames.insert_root();
        let camera = frames.insert_child(root).unwrap_or(root);
        Self {
            id: WorldId::default(),
            order: Vec::new(),
            staged: Vec::new(),
            moves: Vec::new(),
            root,
            camera,
            events: EventHandler::new(),
            updating: false,
        }
    }

    /// This world's id in the engine's arena, null until adopted
    pub fn id(&self) -> WorldId {
        self.id
    }

    /// The anchor frame all of this world's entities hang under
    pub fn root(&self) -> FrameId {
        self.root
    }

    /// The camera frame entities are resolved against when drawn.
    ///
    /// The camera sits beside the entities under the world root, so its
    /// transform applies inversely to everything drawn: moving the camera
    /// right scrolls the scene left, and raising its zoom scales placements
    /// down.
    pub fn camera(&self) -> FrameId {
        self.camera
    }

    /// Live entities in update order. Staged entities are not included.
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Whether the entity is in this world, live or staged
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.order.contains(&id) || self.staged.contains(&id)
    }

    /// Whether an update pass is currently running
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Construct an entity inside this world.
    ///
    /// The entity's frame is created under the world root with the
    /// definition's transform, its added hook runs immediately, and it joins
    /// the live order at the end of the next update pass.
    pub fn spawn(&mut self, cx: &mut Context<'_>, def: EntityDef) -> EntityId {
        let transform = def.transform();
        let frame = match cx.frames.insert_child_with(self.root, transform) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("spawn: world root frame is gone ({err}); entity frame starts detached");
                cx.frames.insert_root_with(transform)
            }
        };
        let id = cx.entities.create(frame, def);
        if let Some(entity) = cx.entities.get_mut(id) {
            entity.world = Some(self.id);
        }
        self.staged.push(id);
        self.dispatch_on_added(cx, id);
        id
    }

    /// Adopt an existing detached entity into this world.
    ///
    /// Fails fast on a stale handle and on entities that already belong to a
    /// world, including this one. On success the entity's frame is
    /// reparented under the world root, keeping its local transform, and the
    /// entity joins the live order at the end of the next update pass.
    pub fn insert(&mut self, cx: &mut Context<'_>, id: EntityId) -> Result<(), WorldError> {
        let entity = cx.entities.get(id).ok_or(WorldError::UnknownEntity)?;
        if entity.world.is_some() || self.contains_entity(id) {
            return Err(WorldError::EntityAlreadyAdded);
        }
        let frame = entity.frame;
        cx.frames.set_parent(frame, self.root)?;
        if let Some(entity) = cx.entities.get_mut(id) {
            entity.world = Some(self.id);
        }
        self.staged.push(id);
        self.dispatch_on_added(cx, id);
        Ok(())
    }

    /// Remove an entity from this world without destroying it.
    ///
    /// The removal hook runs, the entity's connections on this world are
    /// disconnected, and its frame is detached into a root so it keeps a
    /// coherent transform. The entity survives in the arena and can be
    /// inserted into another world. Releasing an entity that is not in the
    /// live order logs a warning and does nothing.
    pub fn release(&mut self, cx: &mut Context<'_>, id: EntityId) {
        let Some(index) = self.order.iter().position(|&e| e == id) else {
            warn!("release: entity {id:?} is not in this world");
            return;
        };
        self.order.remove(index);
        self.detach_entity(cx, id);
    }

    /// Queue an entity transfer to another world.
    ///
    /// The transfer happens at the next safe point: immediately if no update
    /// pass is running, otherwise when the running pass reaches its move
    /// flush. A stale handle or an entity already flagged for removal logs
    /// a warning and drops the transfer; removal wins over a queued move.
    pub fn move_entity(&mut self, cx: &mut Context<'_>, dest: WorldId, id: EntityId) {
        let Some(entity) = cx.entities.get(id) else {
            warn!("move: unknown entity handle {id:?}");
            return;
        };
        if entity.removed {
            warn!("move: entity {id:?} is flagged for removal; dropping transfer");
            return;
        }
        self.moves.push((dest, id));
        if !self.updating {
            self.flush_moves(cx);
        }
    }

    /// Find the entities overlapping one entity's hitbox.
    ///
    /// Hitboxes are compared axis-aligned, offset by each entity's frame
    /// position; rotation and zoom do not enter the test, and touching
    /// edges do not count. `filter` restricts matches to entities carrying
    /// at least one of the given type tags; an empty filter matches every
    /// entity. The subject never matches itself. Entities without a hitbox
    /// never match, and a subject without a hitbox overlaps nothing.
    pub fn collide(
        &self,
        entities: &Entities,
        frames: &FrameTree,
        id: EntityId,
        filter: &[&str],
    ) -> Result<Vec<EntityId>, WorldError> {
        let subject = entities.get(id).ok_or(WorldError::UnknownEntity)?;
        let Some(hitbox) = subject.hitbox else {
            return Ok(Vec::new());
        };
        let subject_box = hitbox.offset(frames.position(subject.frame)?);

        let mut hits = Vec::new();
        for &other_id in &self.order {
            if other_id == id {
                continue;
            }
            let Some(other) = entities.get(other_id) else {
                continue;
            };
            if !filter.is_empty() && !filter.iter().any(|tag| other.has_type(tag)) {
                continue;
            }
            let Some(other_hitbox) = other.hitbox else {
                continue;
            };
            let Ok(position) = frames.position(other.frame) else {
                continue;
            };
            if subject_box.intersects(&other_hitbox.offset(position)) {
                hits.push(other_id);
            }
        }
        Ok(hits)
    }

    /// Register a condition/effect pair on this world's event handler
    pub fn connect<C, E>(&mut self, condition: C, effect: E) -> ConnectionId
    where
        C: FnMut(&World, &Context<'_>) -> bool + 'static,
        E: FnMut(&mut World, &mut Context<'_>) + 'static,
    {
        self.events.connect(condition, effect)
    }

    /// Register an already-boxed condition/effect pair
    pub fn connect_boxed(&mut self, condition: Condition, effect: Effect) -> ConnectionId {
        self.events.connect_boxed(condition, effect)
    }

    /// Register a condition/effect pair on behalf of an entity in this
    /// world.
    ///
    /// The connection is recorded on the entity and torn down automatically
    /// when the entity leaves the world. Fails if the entity is detached or
    /// belongs to another world.
    pub fn connect_entity<C, E>(
        &mut self,
        entities: &mut Entities,
        id: EntityId,
        condition: C,
        effect: E,
    ) -> Result<ConnectionId, WorldError>
    where
        C: FnMut(&World, &Context<'_>) -> bool + 'static,
        E: FnMut(&mut World, &mut Context<'_>) + 'static,
    {
        let entity = entities.get_mut(id).ok_or(WorldError::UnknownEntity)?;
        match entity.world {
            Some(world) if world == self.id => {}
            Some(_) => return Err(WorldError::NotInThisWorld),
            None => return Err(WorldError::EntityHasNoWorld),
        }
        let connection = self.events.connect(condition, effect);
        entity.connections.push(connection);
        Ok(connection)
    }

    /// Remove a connection from all future propagation. Idempotent, and
    /// valid mid-propagation, including from inside the connection's own
    /// effect.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        self.events.disconnect(connection);
    }

    /// Whether a connection is still registered
    pub fn is_connected(&self, connection: ConnectionId) -> bool {
        self.events.is_connected(connection)
    }

    /// Run one update pass.
    ///
    /// Behaviors of all live entities run against a snapshot of the order,
    /// then staged entities join the order, queued moves flush, and entities
    /// flagged for removal are destroyed. Entities that leave the world
    /// mid-pass are skipped when their turn comes; entities flagged for
    /// removal still get their final update.
    pub fn update(&mut self, cx: &mut Context<'_>) {
        self.updating = true;

        let snapshot = self.order.clone();
        for id in snapshot {
            let Some(entity) = cx.entities.get_mut(id) else {
                continue;
            };
            if entity.world != Some(self.id) {
                continue;
            }
            let Some(mut behavior) = entity.behavior.take() else {
                continue;
            };
            behavior.update(id, self, cx);
            self.restore_behavior(cx, id, behavior);
        }

        self.order.append(&mut self.staged);
        self.flush_moves(cx);
        self.cleanup(cx);

        self.updating = false;
    }

    /// Run one event propagation pass.
    ///
    /// Conditions are evaluated in ascending connection order against a
    /// snapshot; each true condition fires its effect before the next is
    /// evaluated. Pairs connected during the pass first run on the next
    /// pass, and disconnected pairs stop firing immediately.
    pub fn propagate(&mut self, cx: &mut Context<'_>) {
        for id in self.events.snapshot_ids() {
            let Some(mut entry) = self.events.begin_evaluation(id) else {
                continue;
            };
            if (entry.condition)(&*self, &*cx) {
                (entry.effect)(self, cx);
            }
            self.events.finish_evaluation(id, entry);
        }
    }

    /// Draw all live entities in layer order.
    ///
    /// The order is stably sorted by layer in place, so entities on equal
    /// layers keep their relative order from frame to frame. Each entity's
    /// placement is resolved from its frame into camera space; a resolution
    /// failure aborts the draw so a broken frame chain cannot render a
    /// half-frame.
    pub fn draw(
        &mut self,
        entities: &Entities,
        frames: &FrameTree,
        canvas: &mut dyn Canvas,
    ) -> Result<(), WorldError> {
        self.order
            .sort_by_key(|&id| entities.get(id).map_or(0, |entity| entity.layer));

        for &id in &self.order {
            let Some(entity) = entities.get(id) else {
                continue;
            };
            let placement = frames.resolve(entity.frame, Some(self.camera))?;
            for graphic in entity.graphics() {
                if graphic.is_visible() {
                    graphic.draw(&placement, canvas);
                }
            }
        }
        Ok(())
    }

    /// Run the added hook of an entity, lifting the behavior out while it
    /// executes
    fn dispatch_on_added(&mut self, cx: &mut Context<'_>, id: EntityId) {
        if let Some(mut behavior) = cx.entities.get_mut(id).and_then(|e| e.behavior.take()) {
            behavior.on_added(id, self, cx);
            self.restore_behavior(cx, id, behavior);
        }
    }

    /// Put a lifted behavior back unless the hook installed a replacement
    fn restore_behavior(&mut self, cx: &mut Context<'_>, id: EntityId, behavior: Box<dyn Behavior>) {
        if let Some(entity) = cx.entities.get_mut(id) {
            if entity.behavior.is_none() {
                entity.behavior = Some(behavior);
            }
        }
    }

    /// Sever an entity from this world without destroying it: removal hook,
    /// connection teardown, backref clear, frame detached into a root
    fn detach_entity(&mut self, cx: &mut Context<'_>, id: EntityId) {
        if let Some(mut behavior) = cx.entities.get_mut(id).and_then(|e| e.behavior.take()) {
            behavior.on_removed(id, self, cx);
            self.restore_behavior(cx, id, behavior);
        }
        if let Some(entity) = cx.entities.get_mut(id) {
            let connections = std::mem::take(&mut entity.connections);
            entity.world = None;
            let frame = entity.frame;
            for connection in connections {
                self.events.disconnect(connection);
            }
            if let Err(err) = cx.frames.detach(frame) {
                warn!("release: entity {id:?} frame was already gone: {err}");
            }
        }
    }

    /// Transfer queued entities out of this world.
    ///
    /// Each move releases the entity here and hands it to the engine's
    /// outbox for insertion into the destination between frames. An entity
    /// that has not yet joined the live order is dropped from the transfer
    /// with a warning, and an entity flagged for removal since the move was
    /// queued stays here so the removal wins.
    fn flush_moves(&mut self, cx: &mut Context<'_>) {
        for (dest, id) in std::mem::take(&mut self.moves) {
            if !self.order.contains(&id) {
                warn!("move: entity {id:?} has not joined this world's order; dropping transfer");
                continue;
            }
            if cx.entities.get(id).is_some_and(|entity| entity.removed) {
                warn!("move: entity {id:?} was flagged for removal; dropping transfer");
                continue;
            }
            self.release(cx, id);
            cx.requests.outbox.push((dest, id));
        }
    }

    /// Destroy every entity flagged for removal: removal hook, connection
    /// teardown, frame node removal, arena removal. Stale ids are culled.
    fn cleanup(&mut self, cx: &mut Context<'_>) {
        let mut index = 0;
        while index < self.order.len() {
            let id = self.order[index];
            let flagged = cx.entities.get(id).map_or(true, |entity| entity.removed);
            if !flagged {
                index += 1;
                continue;
            }
            self.order.remove(index);
            if let Some(mut behavior) = cx.entities.get_mut(id).and_then(|e| e.behavior.take()) {
                behavior.on_removed(id, self, cx);
            }
            if let Some(entity) = cx.entities.remove(id) {
                for connection in entity.connections {
                    self.events.disconnect(connection);
                }
                cx.frames.remove(entity.frame);
            }
        }
    }

    /// Destroy every remaining entity without running removal hooks. Used
    /// by the engine when the world itself is torn down.
    pub(crate) fn purge(&mut self, entities: &mut Entities, frames: &mut FrameTree) {
        for id in self.order.drain(..).chain(self.staged.drain(..)) {
            if let Some(entity) = entities.remove(id) {
                frames.remove(entity.frame);
            }
        }
        frames.remove(self.camera);
        frames.remove(self.root);
    }

    /// Stamp this world's id onto every entity it holds. An entity spawned
    /// into a staged world carries the null id until the engine adopts the
    /// world and assigns the real one.
    pub(crate) fn claim_entities(&self, entities: &mut Entities) {
        for &id in self.order.iter().chain(self.staged.iter()) {
            if let Some(entity) = entities.get_mut(id) {
                entity.world = Some(self.id);
            }
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("live", &self.order.len())
            .field("staged", &self.staged.len())
            .field("connections", &self.events.len())
            .field("updating", &self.updating)
            .finish()
    }
}
