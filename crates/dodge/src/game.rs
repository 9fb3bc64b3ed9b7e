//! World construction and shared game state

use std::cell::Cell;
use std::rc::Rc;

use log::info;
use rand::Rng;
use stage2d::prelude::*;

use crate::behaviors::{Obstacle, Player};
use crate::config::DodgeConfig;

/// Playfield width in world units
pub const FIELD_WIDTH: f32 = 160.0;

/// Playfield height in world units
pub const FIELD_HEIGHT: f32 = 120.0;

/// Player paddle width
pub const PLAYER_WIDTH: f32 = 12.0;

/// Player paddle height
pub const PLAYER_HEIGHT: f32 = 6.0;

/// Obstacle circle radius
pub const OBSTACLE_RADIUS: f32 = 4.0;

/// Type tag carried by every obstacle, used in collision filters
pub const OBSTACLE_TYPE: &str = "obstacle";

/// Score and lives, shared between behaviors and the driver loop
#[derive(Debug)]
pub struct GameStats {
    score: Cell<u32>,
    lives: Cell<u32>,
}

impl GameStats {
    /// Fresh stats with a zero score
    pub fn new(lives: u32) -> Self {
        Self {
            score: Cell::new(0),
            lives: Cell::new(lives),
        }
    }

    /// Obstacles dodged so far
    pub fn score(&self) -> u32 {
        self.score.get()
    }

    /// Lives remaining
    pub fn lives(&self) -> u32 {
        self.lives.get()
    }

    /// Record a dodged obstacle
    pub fn add_dodge(&self) {
        self.score.set(self.score.get() + 1);
    }

    /// Record a hit, returning the lives left afterwards
    pub fn lose_life(&self) -> u32 {
        let left = self.lives.get().saturating_sub(1);
        self.lives.set(left);
        left
    }
}

/// Build the play world: the player paddle, a band of falling obstacles
/// staggered above the field, and the pause hookup on Escape.
pub fn build_play_world(
    engine: &mut Engine,
    config: &DodgeConfig,
    stats: &Rc<GameStats>,
) -> Result<WorldId, EngineError> {
    let id = engine.make_world();
    let config = config.clone();
    let stats = stats.clone();
    engine.scope(id, move |world, cx| {
        world.spawn(
            cx,
            EntityDef::new()
                .with_position(vec2(
                    (FIELD_WIDTH - PLAYER_WIDTH) / 2.0,
                    FIELD_HEIGHT - 2.0 * PLAYER_HEIGHT,
                ))
                .with_type("player")
                .with_layer(1)
                .with_graphic(RectangleShape::new(vec2(PLAYER_WIDTH, PLAYER_HEIGHT)).with_color(Color::GREEN))
                .with_behavior(Player {
                    speed: config.player_speed,
                    stats: stats.clone(),
                }),
        );

        let mut rng = rand::thread_rng();
        for slot in 0..config.obstacle_count {
            let start_y = rng.gen_range(-FIELD_HEIGHT..0.0);
            spawn_obstacle(world, cx, &config, &stats, start_y, slot);
        }

        wire_pause(world);
    })?;
    Ok(id)
}

/// Drop one obstacle into the world at a random column.
///
/// Later slots fall faster so the field does not bunch up into a single
/// row after a few passes.
pub fn spawn_obstacle(
    world: &mut World,
    cx: &mut Context<'_>,
    config: &DodgeConfig,
    stats: &Rc<GameStats>,
    start_y: f32,
    slot: u32,
) -> EntityId {
    let mut rng = rand::thread_rng();
    let x = rng.gen_range(OBSTACLE_RADIUS..FIELD_WIDTH - OBSTACLE_RADIUS);
    let speed = config.fall_speed * (1.0 + slot as f32 * 0.15);
    world.spawn(
        cx,
        EntityDef::new()
            .with_position(vec2(x, start_y))
            .with_type(OBSTACLE_TYPE)
            .with_graphic(CircleShape::new(OBSTACLE_RADIUS).with_color(Color::RED))
            .with_behavior(Obstacle {
                speed,
                stats: stats.clone(),
            }),
    )
}

/// Pressing Escape stages a pause world over the game; pressing it again
/// inside the pause world pops back out.
fn wire_pause(world: &mut World) {
    world.connect_boxed(
        input::key_pressed(Key::Escape),
        Box::new(|_, cx| {
            info!("paused");
            let mut pause = World::new(cx.frames);
            pause.spawn(
                cx,
                EntityDef::new()
                    .with_layer(10)
                    .with_graphic(
                        RectangleShape::new(vec2(FIELD_WIDTH, FIELD_HEIGHT))
                            .with_color(Color::rgba(0, 0, 0, 160)),
                    ),
            );
            pause.connect_boxed(
                input::key_pressed(Key::Escape),
                Box::new(|_, cx| {
                    info!("resumed");
                    cx.requests.pop_world();
                }),
            );
            cx.requests.push_world(pause);
        }),
    );
}
