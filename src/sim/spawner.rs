//! Spawn timing and entity construction
//!
//! Each [`Spawner`] is a retriggering countdown: once the randomized cooldown
//! has elapsed on the wall clock it fires, rolls a fresh cooldown and restarts
//! from the firing time. The jitter keeps the rhythm unpredictable.

use glam::Vec2;
use rand::Rng;
use rand::distr::uniform::SampleUniform;

use super::entity::{Body, EntityKind, HitboxKind};
use super::state::Arena;
use crate::tuning::{SpawnTiming, Tuning};

/// What a spawner produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    /// Single ground obstacle or paired gate
    Obstacle,
    Plane,
    PowerUp,
}

/// Randomized retriggering spawn timer
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    pub kind: SpawnKind,
    pub timing: SpawnTiming,
    current_cooldown_ms: f64,
    last_spawn_ms: f64,
    active: bool,
}

impl Spawner {
    /// Create an active spawner whose first cooldown starts at `now_ms`
    pub fn new<R: Rng + ?Sized>(kind: SpawnKind, timing: SpawnTiming, now_ms: f64, rng: &mut R) -> Self {
        let mut spawner = Self {
            kind,
            timing,
            current_cooldown_ms: timing.base_cooldown_ms,
            last_spawn_ms: now_ms,
            active: false,
        };
        spawner.start(now_ms, rng);
        spawner
    }

    /// Stopped → Active; the countdown restarts from `now_ms`
    pub fn start<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) {
        self.active = true;
        self.last_spawn_ms = now_ms;
        self.current_cooldown_ms = self.roll_cooldown(rng);
    }

    /// Active → Stopped
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_spawn_ms(&self) -> f64 {
        self.last_spawn_ms
    }

    pub fn current_cooldown_ms(&self) -> f64 {
        self.current_cooldown_ms
    }

    /// Returns true when a spawn is due; at most one per call
    pub fn poll<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> bool {
        if !self.active || now_ms - self.last_spawn_ms < self.current_cooldown_ms {
            return false;
        }
        self.last_spawn_ms = now_ms;
        self.current_cooldown_ms = self.roll_cooldown(rng);
        true
    }

    fn roll_cooldown<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.timing.base_cooldown_ms + uniform(rng, self.timing.min_extra_ms, self.timing.max_extra_ms)
    }
}

/// Uniform sample in `[lo, hi]`; degenerate or inverted ranges yield `lo`
fn uniform<T, R>(rng: &mut R, lo: T, hi: T) -> T
where
    T: SampleUniform + PartialOrd + Copy,
    R: Rng + ?Sized,
{
    if lo < hi { rng.random_range(lo..=hi) } else { lo }
}

/// Build the entity a spawner of `kind` produces
///
/// `speed` is the obstacle speed at this moment; the new entity keeps it for
/// its whole life.
pub fn build<R: Rng + ?Sized>(
    kind: SpawnKind,
    arena: &Arena,
    tuning: &Tuning,
    speed: f32,
    rng: &mut R,
) -> EntityKind {
    match kind {
        SpawnKind::Obstacle => {
            if rng.random_bool(tuning.pair_chance.clamp(0.0, 1.0)) {
                if let Some(pair) = paired_gate(arena, tuning, speed, rng) {
                    return EntityKind::Gate(pair);
                }
                log::debug!("Gate does not fit the viewport, spawning a single obstacle");
            }
            let body = ground_obstacle(arena, tuning, speed, rng);
            EntityKind::Ground(maybe_bob(body, arena, tuning, rng))
        }
        SpawnKind::Plane => EntityKind::Plane(plane(arena, tuning, speed, rng)),
        SpawnKind::PowerUp => EntityKind::PowerUp {
            body: power_up(arena, tuning, speed, rng),
            collected: false,
        },
    }
}

fn obstacle_sprite<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> u8 {
    rng.random_range(0..tuning.obstacle_sprites.max(1))
}

/// A ground-anchored obstacle with a random height
pub fn ground_obstacle<R: Rng + ?Sized>(arena: &Arena, tuning: &Tuning, speed: f32, rng: &mut R) -> Body {
    let height = uniform(rng, arena.obstacle_min_height, arena.obstacle_max_height);
    Body::new(
        Vec2::new(arena.spawn_x, arena.ground_y - height),
        Vec2::new(arena.obstacle_width, height),
        speed,
        HitboxKind::Ground,
    )
    .with_sprite(obstacle_sprite(tuning, rng))
}

/// Turn a lone obstacle into a bobbing one with probability `bob_chance`
///
/// Gate members never bob, so their gap stays clearable.
pub fn maybe_bob<R: Rng + ?Sized>(body: Body, arena: &Arena, tuning: &Tuning, rng: &mut R) -> Body {
    if rng.random_bool(tuning.bob_chance.clamp(0.0, 1.0)) {
        body.with_bob(arena.bob_range, arena.bob_speed)
    } else {
        body
    }
}

/// Ground obstacle plus an overhead obstacle hanging above a clearable gap
///
/// The gap between the ground obstacle's top and the overhead obstacle's
/// bottom is exactly `max_jump_height * gate_gap_margin`. The overhead
/// obstacle is shortened to stay below the top margin; `None` if even that
/// leaves no room.
pub fn paired_gate<R: Rng + ?Sized>(
    arena: &Arena,
    tuning: &Tuning,
    speed: f32,
    rng: &mut R,
) -> Option<[Body; 2]> {
    let ground = ground_obstacle(arena, tuning, speed, rng);
    let gap = arena.max_jump_height() * tuning.gate_gap_margin;

    let overhead_bottom = ground.pos.y - gap;
    let height = ground.size.y.min(overhead_bottom - arena.top_margin);
    if height < 1.0 {
        return None;
    }

    let overhead = Body::new(
        Vec2::new(ground.pos.x, overhead_bottom - height),
        Vec2::new(ground.size.x, height),
        speed,
        HitboxKind::Overhead,
    )
    .with_sprite(obstacle_sprite(tuning, rng));

    Some([ground, overhead])
}

/// An airborne obstacle in the upper-middle band, faster than ground traffic
pub fn plane<R: Rng + ?Sized>(arena: &Arena, tuning: &Tuning, speed: f32, rng: &mut R) -> Body {
    let (lo, hi) = tuning.plane_band;
    let height = arena.viewport.height;
    let y = uniform(rng, height * lo, height * hi);
    Body::new(
        Vec2::new(arena.spawn_x, y),
        arena.plane_size,
        speed * tuning.plane_speed_ratio,
        HitboxKind::Plane,
    )
}

/// An invincibility pickup drifting at obstacle speed
pub fn power_up<R: Rng + ?Sized>(arena: &Arena, tuning: &Tuning, speed: f32, rng: &mut R) -> Body {
    let (lo, hi) = tuning.power_up_band;
    let height = arena.viewport.height;
    let y = uniform(rng, height * lo, height * hi);
    Body::new(
        Vec2::new(arena.spawn_x, y),
        Vec2::splat(arena.power_up_size),
        speed,
        HitboxKind::PowerUp,
    )
}
