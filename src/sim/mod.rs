//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Time arrives as arguments; nothing reads a clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod entity;
pub mod geometry;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, check_collision, first_hazard_hit, power_up_hits};
pub use entity::{Bob, Body, Entity, EntityKind, HitboxKind};
pub use geometry::{HitboxInset, Rect};
pub use player::{Invincibility, Player, Pose, max_jump_height};
pub use spawner::{SpawnKind, Spawner};
pub use state::{Arena, DifficultyRamp, GamePhase, RunState, SimEvent, Snapshot, Viewport};
pub use tick::{collect_power_up, enter_game_over, resolve_damage, step};
