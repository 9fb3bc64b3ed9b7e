//! Whole-engine scenarios driving worlds, entities, events, frames, and
//! input together through the public API

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;

use crate::prelude::*;

fn engine_with_world() -> (Engine, WorldId) {
    let mut engine = Engine::new();
    let world = engine.make_world();
    engine.push_world(world).unwrap();
    (engine, world)
}

fn step(engine: &mut Engine) -> RecordingCanvas {
    let mut canvas = RecordingCanvas::new();
    engine.step(&mut canvas).unwrap();
    canvas
}

struct CountUpdates(Rc<Cell<u32>>);

impl Behavior for CountUpdates {
    fn update(&mut self, _me: EntityId, _world: &mut World, _cx: &mut Context<'_>) {
        self.0.set(self.0.get() + 1);
    }
}

struct Hooks {
    added: Rc<Cell<u32>>,
    removed: Rc<Cell<u32>>,
}

impl Behavior for Hooks {
    fn on_added(&mut self, _me: EntityId, _world: &mut World, _cx: &mut Context<'_>) {
        self.added.set(self.added.get() + 1);
    }

    fn on_removed(&mut self, _me: EntityId, _world: &mut World, _cx: &mut Context<'_>) {
        self.removed.set(self.removed.get() + 1);
    }
}

#[test]
fn test_double_insert_rejected_without_count_change() {
    let (mut engine, world) = engine_with_world();
    let id = engine
        .scope(world, |_, cx| {
            cx.entities.spawn_detached(cx.frames, EntityDef::new())
        })
        .unwrap();
    engine
        .scope(world, |world, cx| world.insert(cx, id))
        .unwrap()
        .unwrap();
    step(&mut engine);

    let before = engine.world(world).unwrap().entity_ids().len();
    let second = engine
        .scope(world, |world, cx| world.insert(cx, id))
        .unwrap();
    assert_eq!(second, Err(WorldError::EntityAlreadyAdded));
    assert_eq!(engine.world(world).unwrap().entity_ids().len(), before);
}

struct SpawnChildOnce {
    child_updates: Rc<Cell<u32>>,
    spawned: bool,
}

impl Behavior for SpawnChildOnce {
    fn update(&mut self, _me: EntityId, world: &mut World, cx: &mut Context<'_>) {
        if !self.spawned {
            self.spawned = true;
            world.spawn(
                cx,
                EntityDef::new().with_behavior(CountUpdates(self.child_updates.clone())),
            );
        }
    }
}

#[test]
fn test_entity_spawned_mid_update_waits_one_pass() {
    let (mut engine, world) = engine_with_world();
    let child_updates = Rc::new(Cell::new(0));
    engine
        .scope(world, |world, cx| {
            world.spawn(
                cx,
                EntityDef::new().with_behavior(SpawnChildOnce {
                    child_updates: child_updates.clone(),
                    spawned: false,
                }),
            );
        })
        .unwrap();

    step(&mut engine); // spawner joins the order
    step(&mut engine); // spawner runs, child is created mid-pass
    assert_eq!(child_updates.get(), 0, "child must not update in the pass that created it");
    step(&mut engine);
    assert_eq!(child_updates.get(), 1);
}

struct MoveThenRemove {
    dest: WorldId,
    fired: bool,
}

impl Behavior for MoveThenRemove {
    fn update(&mut self, me: EntityId, world: &mut World, cx: &mut Context<'_>) {
        if self.fired {
            return;
        }
        self.fired = true;
        world.move_entity(cx, self.dest, me);
        if let Some(entity) = cx.entities.get_mut(me) {
            entity.remove();
        }
    }
}

#[test]
fn test_removal_wins_over_same_frame_move() {
    let (mut engine, source) = engine_with_world();
    let dest = engine.make_world();
    let id = engine
        .scope(source, |world, cx| {
            world.spawn(
                cx,
                EntityDef::new().with_behavior(MoveThenRemove { dest, fired: false }),
            )
        })
        .unwrap();

    step(&mut engine); // joins the order
    step(&mut engine); // queues the move, flags removal; removal wins
    assert!(!engine.entities().contains(id));
    assert!(!engine.world(source).unwrap().contains_entity(id));
    assert!(!engine.world(dest).unwrap().contains_entity(id));
}

#[test]
fn test_self_disconnect_leaves_later_connections_running() {
    let (mut engine, world) = engine_with_world();
    let first_fired = Rc::new(Cell::new(0u32));
    let second_fired = Rc::new(Cell::new(0u32));
    engine
        .scope(world, |world, _| {
            let count = first_fired.clone();
            let slot = Rc::new(Cell::new(None));
            let slot_inner = slot.clone();
            let id = world.connect(
                |_, _| true,
                move |world, _| {
                    count.set(count.get() + 1);
                    if let Some(id) = slot_inner.get() {
                        world.disconnect(id);
                    }
                },
            );
            slot.set(Some(id));

            let count = second_fired.clone();
            world.connect(|_, _| true, move |_, _| count.set(count.get() + 1));
        })
        .unwrap();

    step(&mut engine);
    assert_eq!(first_fired.get(), 1);
    assert_eq!(second_fired.get(), 1);

    step(&mut engine);
    assert_eq!(first_fired.get(), 1, "disconnected pair must stay silent");
    assert_eq!(second_fired.get(), 2);
}

#[test]
fn test_draw_orders_layers_low_first_with_stable_ties() {
    let (mut engine, world) = engine_with_world();
    engine
        .scope(world, |world, cx| {
            for (layer, x) in [(0, 1.0), (0, 2.0), (-1, 3.0)] {
                world.spawn(
                    cx,
                    EntityDef::new()
                        .with_layer(layer)
                        .with_position(vec2(x, 0.0))
                        .with_graphic(RectangleShape::new(vec2(1.0, 1.0))),
                );
            }
        })
        .unwrap();

    let canvas = step(&mut engine);
    let xs: Vec<f32> = canvas
        .calls
        .iter()
        .map(|call| call.placement().position.x)
        .collect();
    assert_eq!(xs, vec![3.0, 1.0, 2.0]);
}

#[test]
fn test_camera_position_applies_inversely_to_draw() {
    let (mut engine, world) = engine_with_world();
    engine
        .scope(world, |world, cx| {
            world.spawn(
                cx,
                EntityDef::new()
                    .with_position(vec2(5.0, 5.0))
                    .with_graphic(RectangleShape::new(vec2(1.0, 1.0))),
            );
            cx.frames
                .set_position(world.camera(), vec2(3.0, 1.0))
                .unwrap();
        })
        .unwrap();

    let canvas = step(&mut engine);
    let placement = canvas.calls[0].placement();
    assert_relative_eq!(placement.position.x, 2.0, epsilon = 1e-4);
    assert_relative_eq!(placement.position.y, 4.0, epsilon = 1e-4);
}

#[test]
fn test_nested_entity_frames_compose_for_draw() {
    let (mut engine, world) = engine_with_world();
    engine
        .scope(world, |world, cx| {
            let parent = world.spawn(
                cx,
                EntityDef::new()
                    .with_position(vec2(10.0, 0.0))
                    .with_rotation(90.0),
            );
            let child = world.spawn(
                cx,
                EntityDef::new()
                    .with_position(vec2(0.0, 5.0))
                    .with_graphic(RectangleShape::new(vec2(1.0, 1.0))),
            );
            let parent_frame = cx.entities.get(parent).unwrap().frame();
            let child_frame = cx.entities.get(child).unwrap().frame();
            cx.frames.set_parent(child_frame, parent_frame).unwrap();
        })
        .unwrap();

    let canvas = step(&mut engine);
    let placement = canvas.calls[0].placement();
    assert_relative_eq!(placement.position.x, 5.0, epsilon = 1e-4);
    assert_relative_eq!(placement.position.y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(placement.rotation, 90.0, epsilon = 1e-4);
}

#[test]
fn test_frames_of_different_worlds_do_not_resolve() {
    let mut engine = Engine::new();
    let first = engine.make_world();
    let second = engine.make_world();
    let id = engine
        .scope(first, |world, cx| world.spawn(cx, EntityDef::new()))
        .unwrap();

    let frame = engine.entities().get(id).unwrap().frame();
    let foreign_camera = engine.world(second).unwrap().camera();
    assert_eq!(
        engine.frames().resolve(frame, Some(foreign_camera)),
        Err(FrameError::IncompatibleUniverses)
    );
}

#[test]
fn test_key_conditions_drive_effects() {
    let (mut engine, world) = engine_with_world();
    let pressed_count = Rc::new(Cell::new(0u32));
    let down_count = Rc::new(Cell::new(0u32));
    engine
        .scope(world, |world, _| {
            let count = pressed_count.clone();
            world.connect_boxed(
                input::key_pressed(Key::Space),
                Box::new(move |_, _| count.set(count.get() + 1)),
            );
            let count = down_count.clone();
            world.connect_boxed(
                input::key_down(Key::Space),
                Box::new(move |_, _| count.set(count.get() + 1)),
            );
        })
        .unwrap();

    engine.feed(InputEvent::KeyPressed {
        key: Key::Space,
        modifiers: Modifiers::empty(),
    });
    step(&mut engine);
    assert_eq!(pressed_count.get(), 1);
    assert_eq!(down_count.get(), 1);

    step(&mut engine);
    assert_eq!(pressed_count.get(), 1, "press edge lasts one frame");
    assert_eq!(down_count.get(), 2, "held key keeps the down condition true");
}

#[test]
fn test_pushed_world_pauses_the_one_below() {
    let (mut engine, play) = engine_with_world();
    let play_updates = Rc::new(Cell::new(0u32));
    engine
        .scope(play, |world, cx| {
            world.spawn(
                cx,
                EntityDef::new().with_behavior(CountUpdates(play_updates.clone())),
            );
        })
        .unwrap();

    step(&mut engine);
    step(&mut engine);
    assert_eq!(play_updates.get(), 1);

    engine
        .scope(play, |_, cx| {
            let mut pause = World::new(cx.frames);
            pause.connect(|_, _| true, |_, cx| cx.requests.pop_world());
            cx.requests.push_world(pause);
        })
        .unwrap();

    step(&mut engine); // pause world is active and pops itself at frame end
    assert_eq!(play_updates.get(), 1, "covered world must not update");
    assert_eq!(engine.active_world(), Some(play));

    step(&mut engine);
    assert_eq!(play_updates.get(), 2);
}

#[test]
fn test_entities_spawned_before_staging_update_after_promotion() {
    let (mut engine, base) = engine_with_world();
    let updates = Rc::new(Cell::new(0u32));
    engine
        .scope(base, |_, cx| {
            let mut overlay = World::new(cx.frames);
            overlay.spawn(
                cx,
                EntityDef::new().with_behavior(CountUpdates(updates.clone())),
            );
            cx.requests.push_world(overlay);
        })
        .unwrap();

    step(&mut engine); // overlay promoted, its entity joins the order
    step(&mut engine);
    assert_eq!(updates.get(), 1);
}

#[test]
fn test_effect_move_lands_entity_in_destination_same_frame() {
    let (mut engine, source) = engine_with_world();
    let dest = engine.make_world();
    let added = Rc::new(Cell::new(0u32));
    let removed = Rc::new(Cell::new(0u32));
    let id = engine
        .scope(source, |world, cx| {
            world.spawn(
                cx,
                EntityDef::new().with_behavior(Hooks {
                    added: added.clone(),
                    removed: removed.clone(),
                }),
            )
        })
        .unwrap();
    assert_eq!(added.get(), 1);
    step(&mut engine);

    engine
        .scope(source, |world, _| {
            let fired = Rc::new(Cell::new(false));
            let fired_check = fired.clone();
            world.connect(
                move |_, _| !fired_check.get(),
                move |world, cx| {
                    fired.set(true);
                    world.move_entity(cx, dest, id);
                },
            );
        })
        .unwrap();

    step(&mut engine);
    assert!(!engine.world(source).unwrap().contains_entity(id));
    assert!(engine.world(dest).unwrap().contains_entity(id));
    assert_eq!(engine.entities().get(id).unwrap().world(), Some(dest));
    assert_eq!(removed.get(), 1, "leaving the source runs the removal hook");
    assert_eq!(added.get(), 2, "arriving at the destination runs the added hook");
}

#[test]
fn test_quit_request_stops_the_run_loop() {
    let mut engine = Engine::with_config(EngineConfig {
        fps: 240,
        ..EngineConfig::default()
    });
    let world = engine.make_world();
    engine.push_world(world).unwrap();
    let frames_seen = Rc::new(Cell::new(0u32));
    engine
        .scope(world, |world, _| {
            let count = frames_seen.clone();
            world.connect(
                |_, _| true,
                move |_, cx| {
                    count.set(count.get() + 1);
                    if count.get() >= 3 {
                        cx.requests.quit();
                    }
                },
            );
        })
        .unwrap();

    let mut canvas = RecordingCanvas::new();
    engine.run(&mut canvas).unwrap();
    assert!(!engine.is_running());
    assert_eq!(frames_seen.get(), 3);
}

#[test]
fn test_close_event_ends_the_frame_loop() {
    let (mut engine, _world) = engine_with_world();
    engine.feed(InputEvent::CloseRequested);
    let mut canvas = RecordingCanvas::new();
    engine.run(&mut canvas).unwrap();
    assert!(!engine.is_running());
}
