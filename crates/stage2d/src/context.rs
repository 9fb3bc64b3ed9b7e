//! Per-frame context handed to behaviors, conditions, and effects
//!
//! A [`Context`] bundles mutable access to the engine-owned arenas with the
//! frame's read-only input snapshot. The engine builds one per frame and
//! threads it through every hook, so game code never touches the engine
//! directly while a frame is in flight. Requests that must not take effect
//! mid-frame, pushing and popping worlds and quitting the loop, go through
//! [`Requests`] and are honored at fixed points in the frame instead.

use crate::entity::{Entities, EntityId};
use crate::geometry::FrameTree;
use crate::input::Input;
use crate::world::{World, WorldId};

/// Mutable view of the engine state a frame is allowed to touch
pub struct Context<'a> {
    /// Arena of all entities
    pub entities: &'a mut Entities,
    /// Shared coordinate frame tree
    pub frames: &'a mut FrameTree,
    /// Input snapshot for the current frame
    pub input: &'a Input,
    /// Deferred engine requests, honored between frames
    pub requests: &'a mut Requests,
    /// Seconds elapsed since the previous frame
    pub delta: f32,
}

/// Requests staged during a frame for the engine to honor at safe points.
///
/// Worlds pushed here are promoted onto the stack at most one per frame;
/// pops take effect after drawing. Neither interrupts the frame that issued
/// them.
#[derive(Default)]
pub struct Requests {
    pub(crate) staged_worlds: Vec<World>,
    pub(crate) pop_requested: bool,
    pub(crate) quit_requested: bool,
    pub(crate) outbox: Vec<(WorldId, EntityId)>,
}

impl Requests {
    /// Create an empty request set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a world for promotion onto the world stack.
    ///
    /// The world becomes active at the start of a later frame; the current
    /// frame finishes under the world that staged it.
    pub fn push_world(&mut self, world: World) {
        self.staged_worlds.push(world);
    }

    /// Request that the active world be popped at the end of this frame.
    ///
    /// The popped world is destroyed along with its entities; removal hooks
    /// do not run for teardown by pop.
    pub fn pop_world(&mut self) {
        self.pop_requested = true;
    }

    /// Request that the run loop stop after this frame
    pub fn quit(&mut self) {
        self.quit_requested = true;
    }

    /// Whether a quit has been requested
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl std::fmt::Debug for Requests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requests")
            .field("staged_worlds", &self.staged_worlds.len())
            .field("pop_requested", &self.pop_requested)
            .field("quit_requested", &self.quit_requested)
            .field("outbox", &self.outbox.len())
            .finish()
    }
}
