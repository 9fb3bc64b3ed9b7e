//! A 2D simulation-core game engine.
//!
//! stage2d drives game state without owning a window or a GPU. Worlds of
//! entities update, exchange polled events, and draw through a pluggable
//! [`Canvas`](graphics::Canvas); hosts feed input in as events and decide
//! what to do with the draw commands that come out. The crate covers:
//!
//! - hierarchical coordinate frames with transform resolution between any
//!   two frames ([`geometry`])
//! - entities with behaviors, type tags, hitboxes, and graphics, stored in
//!   a generational arena ([`entity`])
//! - condition/effect event dispatch polled once per frame ([`events`])
//! - worlds with a deferred-mutation update protocol and layered drawing
//!   ([`world`])
//! - a frame driver with a world stack, staged pushes, and pops
//!   ([`engine`])
//!
//! # Quick start
//!
//! ```
//! use stage2d::prelude::*;
//!
//! let mut engine = Engine::new();
//! let world = engine.make_world();
//! engine.push_world(world)?;
//! engine.scope(world, |world, cx| {
//!     world.spawn(
//!         cx,
//!         EntityDef::new()
//!             .with_position(vec2(20.0, 10.0))
//!             .with_graphic(RectangleShape::new(vec2(10.0, 10.0))),
//!     );
//! })?;
//!
//! let mut canvas = RecordingCanvas::new();
//! engine.step(&mut canvas)?;
//! assert_eq!(canvas.calls.len(), 1);
//! # Ok::<(), stage2d::engine::EngineError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments
)]

pub mod config;
pub mod context;
pub mod engine;
pub mod entity;
pub mod events;
pub mod foundation;
pub mod geometry;
pub mod graphics;
pub mod input;
pub mod world;

#[cfg(test)]
mod tests;

/// Single import covering the types most game code touches
pub mod prelude {
    pub use crate::config::{Config, EngineConfig};
    pub use crate::context::{Context, Requests};
    pub use crate::engine::{Engine, EngineError};
    pub use crate::entity::{Behavior, Entities, Entity, EntityDef, EntityId};
    pub use crate::events::{Condition, ConnectionId, Effect, EventHandler};
    pub use crate::foundation::math::{vec2, Rect, Vec2};
    pub use crate::geometry::{FrameError, FrameId, FrameTree, Transform};
    pub use crate::graphics::{
        Canvas, CircleShape, Color, DrawCall, Graphic, RecordingCanvas, RectangleShape,
    };
    pub use crate::input::{self, Input, InputEvent, Key, Modifiers, MouseButton};
    pub use crate::world::{World, WorldError, WorldId};
}
