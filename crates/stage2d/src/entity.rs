//! Entities and the arena that owns them
//!
//! All entities live in one [`Entities`] arena owned by the engine, keyed by
//! generational [`EntityId`] handles. Worlds hold ids, not entities, which is
//! what lets an entity migrate between worlds without its handles going
//! stale. An entity's spatial state is not stored here at all; each entity
//! owns a node in the shared [`FrameTree`] and position, rotation, origin,
//! and zoom are read and written through that node.
//!
//! Game logic attaches as a [`Behavior`], a hook trait the owning world
//! calls on insertion, once per frame, and on removal.
//!
//! [`FrameTree`]: crate::geometry::FrameTree

use slotmap::{new_key_type, SlotMap};

use crate::context::Context;
use crate::events::ConnectionId;
use crate::foundation::math::{Rect, Vec2};
use crate::geometry::{FrameId, FrameTree, Transform};
use crate::graphics::Graphic;
use crate::world::{World, WorldId};

new_key_type! {
    /// Generational handle to an entity in the [`Entities`] arena
    pub struct EntityId;
}

/// Per-frame and lifecycle hooks for an entity.
///
/// All hooks receive the entity's own id alongside the world, since the
/// behavior is lifted out of the entity while it runs and cannot reach
/// itself through the arena.
#[allow(unused_variables)]
pub trait Behavior {
    /// Called once when the entity joins a world
    fn on_added(&mut self, me: EntityId, world: &mut World, cx: &mut Context<'_>) {}

    /// Called once per frame while the entity is in a world
    fn update(&mut self, me: EntityId, world: &mut World, cx: &mut Context<'_>) {}

    /// Called once when the entity leaves its world
    fn on_removed(&mut self, me: EntityId, world: &mut World, cx: &mut Context<'_>) {}
}

/// A simulated object: tags, hitbox, graphics, and an optional behavior.
///
/// Entities are built from an [`EntityDef`] and live in the [`Entities`]
/// arena. Spatial state lives on the entity's frame node; query it through
/// [`FrameTree`] using [`frame`](Self::frame).
pub struct Entity {
    pub(crate) hitbox: Option<Rect>,
    pub(crate) types: Vec<String>,
    pub(crate) layer: i32,
    pub(crate) removed: bool,
    pub(crate) actor_id: u32,
    pub(crate) graphics: Vec<Box<dyn Graphic>>,
    pub(crate) connections: Vec<ConnectionId>,
    pub(crate) world: Option<WorldId>,
    pub(crate) frame: FrameId,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Entity {
    fn new(frame: FrameId) -> Self {
        Self {
            hitbox: None,
            types: Vec::new(),
            layer: 0,
            removed: false,
            actor_id: 0,
            graphics: Vec::new(),
            connections: Vec::new(),
            world: None,
            frame,
            behavior: None,
        }
    }

    /// The entity's node in the shared frame tree
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// The world this entity currently belongs to, if any
    pub fn world(&self) -> Option<WorldId> {
        self.world
    }

    /// Arena-wide unique actor number, assigned at creation and never reused
    pub fn actor_id(&self) -> u32 {
        self.actor_id
    }

    /// Draw-order layer; higher layers draw on top
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Change the draw-order layer
    pub fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    /// Tags used by collision filters
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Add a collision tag
    pub fn add_type(&mut self, tag: impl Into<String>) {
        self.types.push(tag.into());
    }

    /// Whether the entity carries the given tag
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    /// Collision rectangle in frame-local coordinates, if one is set
    pub fn hitbox(&self) -> Option<Rect> {
        self.hitbox
    }

    /// Set or replace the collision rectangle
    pub fn set_hitbox(&mut self, hitbox: Rect) {
        self.hitbox = Some(hitbox);
    }

    /// Flag this entity for removal at the end of the current frame.
    ///
    /// The entity still updates and draws for the remainder of the frame;
    /// its world detaches it during cleanup.
    pub fn remove(&mut self) {
        self.removed = true;
    }

    /// Whether the entity is flagged for end-of-frame removal
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Attach a graphic.
    ///
    /// The first graphic attached to an entity with no hitbox also sets the
    /// hitbox from the graphic's size, anchored at the frame origin. Later
    /// graphics and explicitly set hitboxes are left alone.
    pub fn insert_graphic<G: Graphic + 'static>(&mut self, graphic: G) {
        self.insert_graphic_boxed(Box::new(graphic));
    }

    pub(crate) fn insert_graphic_boxed(&mut self, graphic: Box<dyn Graphic>) {
        if self.hitbox.is_none() && self.graphics.is_empty() {
            self.hitbox = Some(Rect::from_size(graphic.size()));
        }
        self.graphics.push(graphic);
    }

    /// Attached graphics in draw order
    pub fn graphics(&self) -> &[Box<dyn Graphic>] {
        &self.graphics
    }

    /// Mutable access to the attached graphics
    pub fn graphics_mut(&mut self) -> &mut [Box<dyn Graphic>] {
        &mut self.graphics
    }

    /// Connections registered on this entity's behalf, torn down with it
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("actor_id", &self.actor_id)
            .field("types", &self.types)
            .field("layer", &self.layer)
            .field("removed", &self.removed)
            .field("world", &self.world)
            .field("graphics", &self.graphics.len())
            .finish()
    }
}

/// Description of an entity to spawn, built with consuming setters
pub struct EntityDef {
    pub(crate) position: Vec2,
    pub(crate) rotation: f32,
    pub(crate) origin: Vec2,
    pub(crate) zoom: Option<f32>,
    pub(crate) layer: i32,
    pub(crate) types: Vec<String>,
    pub(crate) hitbox: Option<Rect>,
    pub(crate) graphics: Vec<Box<dyn Graphic>>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Default for EntityDef {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            origin: Vec2::zeros(),
            zoom: None,
            layer: 0,
            types: Vec::new(),
            hitbox: None,
            graphics: Vec::new(),
            behavior: None,
        }
    }
}

impl EntityDef {
    /// Start an empty definition at the parent frame's origin
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial position in the parent frame
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Initial rotation in degrees
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Initial frame origin offset
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Initial zoom factor
    #[must_use]
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Draw-order layer
    #[must_use]
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Add a collision tag
    #[must_use]
    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.types.push(tag.into());
        self
    }

    /// Explicit collision rectangle, suppressing the auto-hitbox
    #[must_use]
    pub fn with_hitbox(mut self, hitbox: Rect) -> Self {
        self.hitbox = Some(hitbox);
        self
    }

    /// Attach a graphic
    #[must_use]
    pub fn with_graphic<G: Graphic + 'static>(mut self, graphic: G) -> Self {
        self.graphics.push(Box::new(graphic));
        self
    }

    /// Attach the entity's behavior
    #[must_use]
    pub fn with_behavior<B: Behavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Transform the entity's frame node starts with
    pub(crate) fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
            origin: self.origin,
            zoom: self.zoom.unwrap_or(1.0),
        }
    }

    pub(crate) fn into_entity(self, frame: FrameId) -> Entity {
        let mut entity = Entity::new(frame);
        entity.layer = self.layer;
        entity.types = self.types;
        entity.hitbox = self.hitbox;
        for graphic in self.graphics {
            entity.insert_graphic_boxed(graphic);
        }
        entity.behavior = self.behavior;
        entity
    }
}

/// Arena owning every entity in the engine
#[derive(Default)]
pub struct Entities {
    slots: SlotMap<EntityId, Entity>,
    next_actor: u32,
}

impl Entities {
    /// Create an empty arena
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Realize a definition into the arena, attached to an existing frame
    /// node. Used by worlds when spawning; the node's transform must already
    /// be set.
    pub(crate) fn create(&mut self, frame: FrameId, def: EntityDef) -> EntityId {
        let mut entity = def.into_entity(frame);
        entity.actor_id = self.next_actor;
        self.next_actor += 1;
        self.slots.insert(entity)
    }

    /// Realize a definition with no owning world.
    ///
    /// The entity gets its own root frame and belongs to no world until
    /// [`World::insert`] adopts it.
    ///
    /// [`World::insert`]: crate::world::World::insert
    pub fn spawn_detached(&mut self, frames: &mut FrameTree, def: EntityDef) -> EntityId {
        let frame = frames.insert_root_with(def.transform());
        self.create(frame, def)
    }

    /// Look up an entity
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id)
    }

    /// Look up an entity mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id)
    }

    /// Whether the handle still refers to a live entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(id)
    }

    /// Remove an entity from the arena, returning it if it was live
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.slots.remove(id)
    }

    /// Number of live entities across all worlds
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena holds no entities
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over all live entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::vec2;
    use crate::graphics::RectangleShape;

    #[test]
    fn test_def_carries_fields_into_entity() {
        let mut entities = Entities::new();
        let mut frames = FrameTree::new();
        let def = EntityDef::new()
            .with_position(vec2(3.0, 4.0))
            .with_layer(2)
            .with_type("enemy")
            .with_hitbox(Rect::new(0.0, 0.0, 5.0, 5.0));
        let id = entities.spawn_detached(&mut frames, def);

        let entity = entities.get(id).unwrap();
        assert_eq!(entity.layer(), 2);
        assert!(entity.has_type("enemy"));
        assert_eq!(entity.hitbox().unwrap().w, 5.0);
        assert_eq!(frames.position(entity.frame()).unwrap(), vec2(3.0, 4.0));
        assert!(entity.world().is_none());
    }

    #[test]
    fn test_first_graphic_sets_hitbox_once() {
        let mut entities = Entities::new();
        let mut frames = FrameTree::new();
        let def = EntityDef::new()
            .with_graphic(RectangleShape::new(vec2(8.0, 6.0)))
            .with_graphic(RectangleShape::new(vec2(100.0, 100.0)));
        let id = entities.spawn_detached(&mut frames, def);

        let hitbox = entities.get(id).unwrap().hitbox().unwrap();
        assert_eq!((hitbox.w, hitbox.h), (8.0, 6.0));
    }

    #[test]
    fn test_explicit_hitbox_beats_auto_hitbox() {
        let mut entities = Entities::new();
        let mut frames = FrameTree::new();
        let def = EntityDef::new()
            .with_hitbox(Rect::new(1.0, 1.0, 2.0, 2.0))
            .with_graphic(RectangleShape::new(vec2(50.0, 50.0)));
        let id = entities.spawn_detached(&mut frames, def);

        let hitbox = entities.get(id).unwrap().hitbox().unwrap();
        assert_eq!((hitbox.w, hitbox.h), (2.0, 2.0));
    }

    #[test]
    fn test_actor_ids_are_unique() {
        let mut entities = Entities::new();
        let mut frames = FrameTree::new();
        let a = entities.spawn_detached(&mut frames, EntityDef::new());
        let b = entities.spawn_detached(&mut frames, EntityDef::new());
        assert_ne!(
            entities.get(a).unwrap().actor_id(),
            entities.get(b).unwrap().actor_id()
        );
    }

    #[test]
    fn test_remove_flag_is_sticky() {
        let mut entities = Entities::new();
        let mut frames = FrameTree::new();
        let id = entities.spawn_detached(&mut frames, EntityDef::new());

        let entity = entities.get_mut(id).unwrap();
        assert!(!entity.is_removed());
        entity.remove();
        entity.remove();
        assert!(entity.is_removed());
    }
}
