//! Game tuning, loaded from disk when a `dodge.toml` is present

use serde::{Deserialize, Serialize};
use stage2d::prelude::Config;

/// Tunable gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeConfig {
    /// Starting lives
    pub lives: u32,

    /// Obstacles kept falling at once
    pub obstacle_count: u32,

    /// Horizontal player speed in units per second
    pub player_speed: f32,

    /// Fall speed of the slowest obstacle in units per second
    pub fall_speed: f32,
}

impl Default for DodgeConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            obstacle_count: 6,
            player_speed: 90.0,
            fall_speed: 40.0,
        }
    }
}

impl Config for DodgeConfig {}
