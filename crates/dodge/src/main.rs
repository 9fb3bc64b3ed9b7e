//! Falling-block dodging game, run headless.
//!
//! The engine is backend-agnostic, so this demo drives it with a
//! scripted input feed against a recording canvas and runs anywhere
//! without a window or GPU. The game underneath is real: a paddle
//! dodging falling blocks, with pause, lives, and game over.

mod behaviors;
mod config;
mod game;

use std::rc::Rc;
use std::time::{Duration, Instant};

use log::info;
use stage2d::prelude::*;

use crate::config::DodgeConfig;
use crate::game::GameStats;

/// Frames simulated before the demo calls it a day
const FRAME_BUDGET: u32 = 600;

/// Simulation rate for the driver loop
const DEMO_FPS: u32 = 120;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    stage2d::foundation::logging::init();

    let config = DodgeConfig::load_or_default("dodge.toml");
    info!(
        "dodge starting: {} obstacles, {} lives",
        config.obstacle_count, config.lives
    );

    let stats = Rc::new(GameStats::new(config.lives));
    let mut engine = Engine::with_config(EngineConfig {
        window_size: [game::FIELD_WIDTH as u32, game::FIELD_HEIGHT as u32],
        fps: DEMO_FPS,
        log_frame_stats: true,
    });
    let play = game::build_play_world(&mut engine, &config, &stats)?;
    engine.push_world(play)?;

    let script = input_script();
    let budget = Duration::from_secs_f64(1.0 / f64::from(DEMO_FPS));
    let mut canvas = RecordingCanvas::new();
    for frame in 0..FRAME_BUDGET {
        for (at, event) in &script {
            if *at == frame {
                engine.feed(*event);
            }
        }
        let frame_start = Instant::now();
        canvas.clear();
        engine.step(&mut canvas)?;
        if engine.active_world().is_none() {
            break;
        }
        if let Some(rest) = budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!(
        "demo finished: dodged {} with {} lives left",
        stats.score(),
        stats.lives()
    );
    Ok(())
}

/// The scripted session: drift right, drift left, pause and resume,
/// then drift right until time runs out. Frame numbers index from the
/// first `step`.
fn input_script() -> Vec<(u32, InputEvent)> {
    let none = Modifiers::empty();
    vec![
        (20, InputEvent::KeyPressed { key: Key::Right, modifiers: none }),
        (140, InputEvent::KeyReleased { key: Key::Right, modifiers: none }),
        (160, InputEvent::KeyPressed { key: Key::Left, modifiers: none }),
        (280, InputEvent::KeyReleased { key: Key::Left, modifiers: none }),
        (300, InputEvent::KeyPressed { key: Key::Escape, modifiers: none }),
        (302, InputEvent::KeyReleased { key: Key::Escape, modifiers: none }),
        (360, InputEvent::KeyPressed { key: Key::Escape, modifiers: none }),
        (362, InputEvent::KeyReleased { key: Key::Escape, modifiers: none }),
        (380, InputEvent::KeyPressed { key: Key::Right, modifiers: none }),
        (500, InputEvent::KeyReleased { key: Key::Right, modifiers: none }),
    ]
}
