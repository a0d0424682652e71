//! Data-driven game balance
//!
//! Every value here is authored at the 800 px reference resolution and the
//! 60 Hz reference tick. Sizes and speeds are multiplied by the viewport
//! scale when the arena is built; timings are wall-clock milliseconds and
//! never scaled.

use serde::{Deserialize, Serialize};

use crate::sim::geometry::HitboxInset;

/// Randomized spawn cadence for one kind of entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTiming {
    /// Fixed part of the cooldown (ms)
    pub base_cooldown_ms: f64,
    /// Lower bound of the random extra delay (ms, inclusive)
    pub min_extra_ms: f64,
    /// Upper bound of the random extra delay (ms)
    pub max_extra_ms: f64,
}

impl SpawnTiming {
    pub const fn new(base_cooldown_ms: f64, min_extra_ms: f64, max_extra_ms: f64) -> Self {
        Self {
            base_cooldown_ms,
            min_extra_ms,
            max_extra_ms,
        }
    }
}

/// Hitbox insets for the player and each entity kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxTuning {
    pub player: HitboxInset,
    pub ground: HitboxInset,
    pub overhead: HitboxInset,
    pub plane: HitboxInset,
    pub power_up: HitboxInset,
}

impl Default for HitboxTuning {
    fn default() -> Self {
        Self {
            player: HitboxInset::new(0.2, 0.2, 0.6, 0.6),
            ground: HitboxInset::new(0.05, 0.05, 0.9, 0.9),
            overhead: HitboxInset::new(0.1, 0.1, 0.8, 0.8),
            plane: HitboxInset::new(0.1, 0.1, 0.8, 0.8),
            power_up: HitboxInset::new(0.1, 0.1, 0.8, 0.8),
        }
    }
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics (px per reference tick) ===
    pub gravity: f32,
    /// Negative: up is -y
    pub jump_force: f32,
    /// Second jump strength relative to the first
    pub double_jump_ratio: f32,

    // === Sizes (px at reference resolution) ===
    pub player_size: f32,
    /// Distance from the bottom edge to the ground line
    pub ground_offset: f32,
    /// Player's horizontal position as a fraction of the viewport width
    pub player_x_ratio: f32,
    pub obstacle_width: f32,
    pub obstacle_min_height: f32,
    pub obstacle_max_height: f32,
    pub plane_width: f32,
    pub plane_height: f32,
    pub power_up_size: f32,
    /// How far past the right edge new entities appear (unscaled px)
    pub spawn_offset: f32,
    /// Highest point an overhead obstacle may reach
    pub top_margin: f32,
    /// Number of obstacle sprite variants to choose from
    pub obstacle_sprites: u8,

    // === Spawning ===
    pub obstacle_spawn: SpawnTiming,
    pub plane_spawn: SpawnTiming,
    pub power_up_spawn: SpawnTiming,
    /// Probability that an obstacle spawn is a paired gate
    pub pair_chance: f64,
    /// Probability that a lone ground obstacle bobs up and down
    pub bob_chance: f64,
    /// Maximum bob displacement either side of the spawn height
    pub bob_range: f32,
    /// Bob speed per reference tick
    pub bob_speed: f32,
    /// Gate gap as a multiple of the maximum single-jump height
    pub gate_gap_margin: f32,
    /// Plane speed relative to the current obstacle speed
    pub plane_speed_ratio: f32,
    /// Vertical spawn band for planes, as fractions of viewport height
    pub plane_band: (f32, f32),
    /// Vertical spawn band for power-ups, as fractions of viewport height
    pub power_up_band: (f32, f32),

    // === Collision ===
    pub hitboxes: HitboxTuning,

    // === Health & invincibility ===
    pub max_health: u32,
    pub hit_grace_ms: f64,
    pub power_up_invincibility_ms: f64,

    // === Score & difficulty ===
    /// Score gained per reference tick
    pub score_rate: f32,
    pub base_obstacle_speed: f32,
    pub speed_up_interval_ms: f64,
    pub speed_up_increment: f32,
    pub score_checkpoint: f32,
    pub score_speed_multiplier: f32,

    // === Animation ===
    pub walk_frames: u8,
    pub walk_frame_ms: f64,
    pub jump_frames: u8,
    pub jump_frame_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            jump_force: -16.0,
            double_jump_ratio: 0.8,

            player_size: 100.0,
            ground_offset: 100.0,
            player_x_ratio: 0.2,
            obstacle_width: 45.0,
            obstacle_min_height: 55.0,
            obstacle_max_height: 85.0,
            plane_width: 120.0,
            plane_height: 60.0,
            power_up_size: 50.0,
            spawn_offset: 100.0,
            top_margin: 10.0,
            obstacle_sprites: 3,

            obstacle_spawn: SpawnTiming::new(900.0, 200.0, 1200.0),
            plane_spawn: SpawnTiming::new(5000.0, 1000.0, 3000.0),
            power_up_spawn: SpawnTiming::new(7000.0, 1000.0, 3000.0),
            pair_chance: 0.3,
            bob_chance: 0.3,
            bob_range: 80.0,
            bob_speed: 1.2,
            gate_gap_margin: 1.2,
            plane_speed_ratio: 1.2,
            plane_band: (0.3, 0.6),
            power_up_band: (0.2, 0.7),

            hitboxes: HitboxTuning::default(),

            max_health: 3,
            hit_grace_ms: 1000.0,
            power_up_invincibility_ms: 3000.0,

            score_rate: 0.3,
            base_obstacle_speed: 4.0,
            speed_up_interval_ms: 25_000.0,
            speed_up_increment: 0.5,
            score_checkpoint: 300.0,
            score_speed_multiplier: 1.2,

            walk_frames: 6,
            walk_frame_ms: 150.0,
            jump_frames: 8,
            jump_frame_ms: 100.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning override file; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
