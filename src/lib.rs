//! Ramen Runner - A side-scrolling endless runner
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (physics, spawners, collisions, run state)
//! - `game`: Binds the simulation to its clock, storage and audio collaborators
//! - `persistence`: Key/value storage backends (memory, files, LocalStorage)
//! - `platform`: Browser/native time sources
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Reference constants shared by every size and speed in the game
pub mod consts {
    /// Frame time the physics constants are authored against (60 Hz)
    pub const REFERENCE_FRAME_MS: f32 = 16.67;
    /// Viewport edge length (px) at which `scale == 1.0`
    pub const REFERENCE_RESOLUTION: f32 = 800.0;
    /// Leaderboard length
    pub const MAX_HIGH_SCORES: usize = 5;
}

/// Normalize an elapsed frame time to the 60 Hz reference tick
#[inline]
pub fn frame_factor(delta_ms: f32) -> f32 {
    delta_ms.max(0.0) / consts::REFERENCE_FRAME_MS
}
