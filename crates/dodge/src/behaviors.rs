//! Behaviors for the player paddle and the falling obstacles

use std::rc::Rc;

use log::{info, warn};
use rand::Rng;
use stage2d::prelude::*;

use crate::game::{GameStats, FIELD_HEIGHT, FIELD_WIDTH, OBSTACLE_RADIUS, OBSTACLE_TYPE, PLAYER_WIDTH};

/// Keyboard-steered paddle near the bottom edge
pub struct Player {
    /// Horizontal speed in units per second
    pub speed: f32,

    /// Shared score and lives
    pub stats: Rc<GameStats>,
}

impl Behavior for Player {
    fn update(&mut self, me: EntityId, world: &mut World, cx: &mut Context<'_>) {
        let Some(entity) = cx.entities.get(me) else {
            return;
        };
        let frame = entity.frame();

        let keyboard = cx.input.keyboard();
        let mut dx = 0.0;
        if keyboard.is_down(Key::Left) {
            dx -= self.speed * cx.delta;
        }
        if keyboard.is_down(Key::Right) {
            dx += self.speed * cx.delta;
        }
        if dx != 0.0 {
            let _ = cx.frames.move_by(frame, vec2(dx, 0.0));
            if let Ok(position) = cx.frames.position(frame) {
                let clamped = position.x.clamp(0.0, FIELD_WIDTH - PLAYER_WIDTH);
                if clamped != position.x {
                    let _ = cx.frames.set_position(frame, vec2(clamped, position.y));
                }
            }
        }

        let hits = match world.collide(cx.entities, cx.frames, me, &[OBSTACLE_TYPE]) {
            Ok(hits) => hits,
            Err(err) => {
                warn!("player collision query failed: {err}");
                return;
            }
        };
        for hit in hits {
            // knock the block back to the top instead of despawning it, so
            // the field density stays constant
            let mut rng = rand::thread_rng();
            let x = rng.gen_range(OBSTACLE_RADIUS..FIELD_WIDTH - OBSTACLE_RADIUS);
            if let Some(obstacle) = cx.entities.get(hit) {
                let _ = cx
                    .frames
                    .set_position(obstacle.frame(), vec2(x, -OBSTACLE_RADIUS * 2.0));
            }
            let left = self.stats.lose_life();
            info!("hit! {left} lives left");
            if left == 0 {
                info!("game over after dodging {}", self.stats.score());
                cx.requests.pop_world();
                return;
            }
        }
    }
}

/// Falling block that scores a dodge each time it clears the bottom edge
pub struct Obstacle {
    /// Fall speed in units per second
    pub speed: f32,

    /// Shared score and lives
    pub stats: Rc<GameStats>,
}

impl Behavior for Obstacle {
    fn update(&mut self, me: EntityId, _world: &mut World, cx: &mut Context<'_>) {
        let Some(entity) = cx.entities.get(me) else {
            return;
        };
        let frame = entity.frame();
        if cx
            .frames
            .move_by(frame, vec2(0.0, self.speed * cx.delta))
            .is_err()
        {
            return;
        }
        let Ok(position) = cx.frames.position(frame) else {
            return;
        };
        if position.y > FIELD_HEIGHT {
            self.stats.add_dodge();
            let mut rng = rand::thread_rng();
            let x = rng.gen_range(OBSTACLE_RADIUS..FIELD_WIDTH - OBSTACLE_RADIUS);
            let _ = cx.frames.set_position(frame, vec2(x, -OBSTACLE_RADIUS * 2.0));
        }
    }
}
