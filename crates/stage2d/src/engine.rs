//! The engine: arenas, world stack, and the frame driver
//!
//! [`Engine`] owns everything the simulation shares: the entity arena, the
//! coordinate frame tree, the worlds, and the input state. One frame of
//! [`step`] runs a fixed sequence against the world on top of the stack:
//!
//! 1. promote at most one staged world onto the stack
//! 2. apply queued input events
//! 3. update the active world
//! 4. propagate the active world's events
//! 5. deliver queued cross-world entity transfers
//! 6. draw the active world
//! 7. honor at most one requested pop
//!
//! Game code only ever sees the [`Context`] built for steps 3 to 5, so
//! every structural change it requests lands at one of the fixed points
//! above rather than mid-iteration. [`run`] repeats [`step`] under a fixed
//! frame budget until a quit is requested or the stack empties.
//!
//! [`step`]: Engine::step
//! [`run`]: Engine::run

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use slotmap::SlotMap;
use thiserror::Error;

use crate::config::{Config, ConfigError, EngineConfig};
use crate::context::{Context, Requests};
use crate::entity::{Entities, EntityId};
use crate::foundation::time::Timer;
use crate::geometry::FrameTree;
use crate::graphics::Canvas;
use crate::input::{Input, InputEvent};
use crate::world::{World, WorldError, WorldId};

/// Errors from engine-level operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// A world handle does not refer to a live world
    #[error("unknown world handle")]
    UnknownWorld,

    /// A world entity operation failed
    #[error(transparent)]
    World(#[from] WorldError),

    /// Engine configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Owner of all simulation state and driver of the frame loop
pub struct Engine {
    entities: Entities,
    frames: FrameTree,
    worlds: SlotMap<WorldId, World>,
    stack: Vec<WorldId>,
    input: Input,
    requests: Requests,
    timer: Timer,
    config: EngineConfig,
    running: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with the given configuration
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        info!(
            "engine starting: {}x{} at {} fps",
            config.window_size[0], config.window_size[1], config.fps
        );
        Self {
            entities: Entities::new(),
            frames: FrameTree::new(),
            worlds: SlotMap::with_key(),
            stack: Vec::new(),
            input: Input::new(),
            requests: Requests::new(),
            timer: Timer::new(),
            config,
            running: false,
        }
    }

    /// Create an engine configured from a `.toml` or `.ron` file
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        Ok(Self::with_config(EngineConfig::load_from_file(path)?))
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the entity arena
    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    /// Read access to the coordinate frame tree
    pub fn frames(&self) -> &FrameTree {
        &self.frames
    }

    /// Look up a world by id
    pub fn world(&self, id: WorldId) -> Option<&World> {
        self.worlds.get(id)
    }

    /// The world currently on top of the stack, if any
    pub fn active_world(&self) -> Option<WorldId> {
        self.stack.last().copied()
    }

    /// Whether the run loop is live
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Create an empty world in the engine.
    ///
    /// The world exists but is not active until pushed; see
    /// [`push_world`](Self::push_world).
    pub fn make_world(&mut self) -> WorldId {
        let world = World::new(&mut self.frames);
        self.worlds.insert_with_key(|key| {
            let mut world = world;
            world.id = key;
            world
        })
    }

    /// Push an existing world onto the stack, making it the active world.
    ///
    /// This takes effect immediately and is meant for setup; game code
    /// running inside a frame stages new worlds through
    /// [`Requests::push_world`] instead.
    pub fn push_world(&mut self, id: WorldId) -> Result<(), EngineError> {
        if !self.worlds.contains_key(id) {
            return Err(EngineError::UnknownWorld);
        }
        self.stack.push(id);
        Ok(())
    }

    /// Queue an input event for the next frame
    pub fn feed(&mut self, event: InputEvent) {
        self.input.feed(event);
    }

    /// Run a closure against one world with a full frame context.
    ///
    /// The entry point for populating worlds during setup and for poking at
    /// engine state in tests; the closure sees exactly what a behavior
    /// sees, with a zero frame delta.
    pub fn scope<R>(
        &mut self,
        id: WorldId,
        f: impl FnOnce(&mut World, &mut Context<'_>) -> R,
    ) -> Result<R, EngineError> {
        let world = self.worlds.get_mut(id).ok_or(EngineError::UnknownWorld)?;
        let mut cx = Context {
            entities: &mut self.entities,
            frames: &mut self.frames,
            input: &self.input,
            requests: &mut self.requests,
            delta: 0.0,
        };
        let result = f(world, &mut cx);
        self.drain_outbox(0.0);
        Ok(result)
    }

    /// Transfer an entity between two worlds outside a frame.
    ///
    /// The destination is validated before the entity is released from the
    /// source, so a bad destination handle leaves the entity where it was.
    pub fn move_entity(
        &mut self,
        source: WorldId,
        dest: WorldId,
        id: EntityId,
    ) -> Result<(), EngineError> {
        if !self.worlds.contains_key(dest) {
            return Err(EngineError::UnknownWorld);
        }
        let source_world = self
            .worlds
            .get_mut(source)
            .ok_or(EngineError::UnknownWorld)?;
        let mut cx = Context {
            entities: &mut self.entities,
            frames: &mut self.frames,
            input: &self.input,
            requests: &mut self.requests,
            delta: 0.0,
        };
        source_world.move_entity(&mut cx, dest, id);
        self.drain_outbox(0.0);
        Ok(())
    }

    /// Run one frame against the active world.
    ///
    /// With an empty stack the engine stops instead of erroring; popping
    /// the last world is the normal way a game ends. Frame-aborting errors
    /// come from drawing through broken frame chains.
    pub fn step(&mut self, canvas: &mut dyn Canvas) -> Result<(), EngineError> {
        self.timer.tick();

        // one staged world may become active per frame
        if !self.requests.staged_worlds.is_empty() {
            let staged = self.requests.staged_worlds.remove(0);
            let id = self.worlds.insert_with_key(|key| {
                let mut world = staged;
                world.id = key;
                world
            });
            if let Some(world) = self.worlds.get(id) {
                world.claim_entities(&mut self.entities);
            }
            self.stack.push(id);
            info!("promoted staged world {id:?} onto the stack");
        }

        let Some(&active) = self.stack.last() else {
            warn!("step: world stack is empty; stopping");
            self.running = false;
            return Ok(());
        };

        self.input.begin_frame();
        if self.input.close_requested() {
            self.requests.quit();
        }

        let delta = self.timer.delta_seconds();
        let world = self.worlds.get_mut(active).ok_or(EngineError::UnknownWorld)?;
        let mut cx = Context {
            entities: &mut self.entities,
            frames: &mut self.frames,
            input: &self.input,
            requests: &mut self.requests,
            delta,
        };
        world.update(&mut cx);
        world.propagate(&mut cx);

        self.drain_outbox(delta);

        let world = self.worlds.get_mut(active).ok_or(EngineError::UnknownWorld)?;
        world.draw(&self.entities, &self.frames, canvas)?;

        if self.requests.pop_requested {
            self.requests.pop_requested = false;
            match self.stack.pop() {
                Some(id) => {
                    if let Some(mut world) = self.worlds.remove(id) {
                        world.purge(&mut self.entities, &mut self.frames);
                    }
                    info!("popped world {id:?}; {} remain on the stack", self.stack.len());
                }
                None => warn!("pop: world stack is already empty"),
            }
        }

        if self.requests.quit_requested {
            self.requests.quit_requested = false;
            self.running = false;
        }

        if self.config.log_frame_stats && self.timer.frame_count() % 60 == 0 {
            debug!(
                "frame {}: {:.1} fps, {} entities",
                self.timer.frame_count(),
                self.timer.fps(),
                self.entities.len()
            );
        }
        Ok(())
    }

    /// Step repeatedly under the configured frame budget until a quit is
    /// requested or the world stack empties
    pub fn run(&mut self, canvas: &mut dyn Canvas) -> Result<(), EngineError> {
        self.running = true;
        let budget = Duration::from_secs_f64(1.0 / f64::from(self.config.fps.max(1)));
        while self.running {
            let frame_start = Instant::now();
            self.step(canvas)?;
            let spent = frame_start.elapsed();
            if spent < budget {
                std::thread::sleep(budget - spent);
            }
        }
        info!("run loop stopped after {} frames", self.timer.frame_count());
        Ok(())
    }

    /// Insert queued cross-world transfers into their destinations.
    ///
    /// A dead destination or a refused insert strands the entity detached
    /// in the arena; both are logged. Transfers queued by the added hooks
    /// firing here wait for the next drain.
    fn drain_outbox(&mut self, delta: f32) {
        let transfers = std::mem::take(&mut self.requests.outbox);
        for (dest, id) in transfers {
            let Some(world) = self.worlds.get_mut(dest) else {
                warn!("move: destination world {dest:?} no longer exists; entity {id:?} left detached");
                continue;
            };
            let mut cx = Context {
                entities: &mut self.entities,
                frames: &mut self.frames,
                input: &self.input,
                requests: &mut self.requests,
                delta,
            };
            if let Err(err) = world.insert(&mut cx, id) {
                warn!("move: entity {id:?} was not accepted by world {dest:?}: {err}");
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("worlds", &self.worlds.len())
            .field("stack", &self.stack)
            .field("entities", &self.entities.len())
            .field("frame", &self.timer.frame_count())
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityDef;
    use crate::foundation::math::vec2;
    use crate::graphics::{RecordingCanvas, RectangleShape};

    #[test]
    fn test_step_with_empty_stack_stops() {
        let mut engine = Engine::new();
        let mut canvas = RecordingCanvas::new();
        engine.running = true;
        engine.step(&mut canvas).unwrap();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_spawned_entity_draws_after_a_step() {
        let mut engine = Engine::new();
        let world = engine.make_world();
        engine.push_world(world).unwrap();
        engine
            .scope(world, |world, cx| {
                world.spawn(
                    cx,
                    EntityDef::new()
                        .with_position(vec2(5.0, 5.0))
                        .with_graphic(RectangleShape::new(vec2(2.0, 2.0))),
                );
            })
            .unwrap();

        let mut canvas = RecordingCanvas::new();
        engine.step(&mut canvas).unwrap();
        assert_eq!(canvas.calls.len(), 1);
        assert_eq!(canvas.calls[0].placement().position, vec2(5.0, 5.0));
    }

    #[test]
    fn test_pop_request_destroys_world_without_hooks() {
        let mut engine = Engine::new();
        let world = engine.make_world();
        engine.push_world(world).unwrap();
        engine
            .scope(world, |world, cx| {
                world.spawn(cx, EntityDef::new());
                cx.requests.pop_world();
            })
            .unwrap();

        let mut canvas = RecordingCanvas::new();
        engine.step(&mut canvas).unwrap();
        assert!(engine.world(world).is_none());
        assert!(engine.active_world().is_none());
        assert!(engine.entities().is_empty());
    }

    #[test]
    fn test_staged_world_promotes_next_frame() {
        let mut engine = Engine::new();
        let base = engine.make_world();
        engine.push_world(base).unwrap();
        engine
            .scope(base, |_, cx| {
                let overlay = World::new(cx.frames);
                cx.requests.push_world(overlay);
            })
            .unwrap();
        assert_eq!(engine.active_world(), Some(base));

        let mut canvas = RecordingCanvas::new();
        engine.step(&mut canvas).unwrap();
        let overlay = engine.active_world().unwrap();
        assert_ne!(overlay, base);
    }

    #[test]
    fn test_engine_move_validates_destination_first() {
        let mut engine = Engine::new();
        let source = engine.make_world();
        engine.push_world(source).unwrap();
        let id = engine
            .scope(source, |world, cx| world.spawn(cx, EntityDef::new()))
            .unwrap();
        let mut canvas = RecordingCanvas::new();
        engine.step(&mut canvas).unwrap();

        let dest = engine.make_world();
        let gone = dest;
        engine.worlds.remove(gone);
        assert!(matches!(
            engine.move_entity(source, gone, id),
            Err(EngineError::UnknownWorld)
        ));
        assert!(engine.world(source).unwrap().contains_entity(id));

        let dest = engine.make_world();
        engine.move_entity(source, dest, id).unwrap();
        assert!(engine.world(dest).unwrap().contains_entity(id));
        assert!(!engine.world(source).unwrap().contains_entity(id));
    }
}
