//! Run state and world metrics
//!
//! `RunState` is the single mutable aggregate the frame driver steps and the
//! renderer reads. It owns its spawners and RNG; nothing is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::geometry::Rect;
use super::player::{Player, Pose, max_jump_height};
use super::spawner::{SpawnKind, Spawner};
use crate::consts::REFERENCE_RESOLUTION;
use crate::tuning::Tuning;

/// Host-provided drawing surface dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Multiplier applied to every size and speed
    pub scale: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// Host helper: scale so the shorter edge maps to the reference resolution
    pub fn fit(width: f32, height: f32) -> Self {
        Self::new(width, height, width.min(height) / REFERENCE_RESOLUTION)
    }
}

/// Scaled world metrics derived from a viewport and the tuning
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    pub viewport: Viewport,
    /// y of the ground line
    pub ground_y: f32,
    pub player_x: f32,
    pub player_size: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub obstacle_width: f32,
    pub obstacle_min_height: f32,
    pub obstacle_max_height: f32,
    pub plane_size: Vec2,
    pub power_up_size: f32,
    /// x where new entities appear
    pub spawn_x: f32,
    pub top_margin: f32,
    pub bob_range: f32,
    pub bob_speed: f32,
    pub base_speed: f32,
    pub speed_increment: f32,
}

impl Arena {
    pub fn new(viewport: Viewport, tuning: &Tuning) -> Self {
        let s = viewport.scale;
        Self {
            viewport,
            ground_y: viewport.height - tuning.ground_offset * s,
            player_x: viewport.width * tuning.player_x_ratio,
            player_size: tuning.player_size * s,
            gravity: tuning.gravity * s,
            jump_force: tuning.jump_force * s,
            obstacle_width: tuning.obstacle_width * s,
            obstacle_min_height: tuning.obstacle_min_height * s,
            obstacle_max_height: tuning.obstacle_max_height * s,
            plane_size: Vec2::new(tuning.plane_width, tuning.plane_height) * s,
            power_up_size: tuning.power_up_size * s,
            spawn_x: viewport.width + tuning.spawn_offset,
            top_margin: tuning.top_margin * s,
            bob_range: tuning.bob_range * s,
            bob_speed: tuning.bob_speed * s,
            base_speed: tuning.base_obstacle_speed * s,
            speed_increment: tuning.speed_up_increment * s,
        }
    }

    /// Player's top edge while standing on the ground
    pub fn player_ground_top(&self) -> f32 {
        self.ground_y - self.player_size
    }

    pub fn max_jump_height(&self) -> f32 {
        max_jump_height(self.jump_force, self.gravity)
    }
}

/// Phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    Paused,
    /// Terminal until `restart`
    GameOver,
}

/// Things that happened during a step, for the audio/persistence collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Jumped,
    Hit { health: u32 },
    PowerUpCollected,
    SpeedUp { speed: f32 },
    GameOver { score: u32 },
    Paused,
    Resumed,
    Restarted,
}

/// Which speed ramps fired this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RampFired {
    pub time: bool,
    pub score: bool,
}

/// Time- and score-triggered obstacle speed increases
///
/// Each trigger advances its own marker so a threshold fires exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRamp {
    pub last_speed_up_ms: f64,
    pub last_score_checkpoint: f32,
}

impl DifficultyRamp {
    pub fn new(now_ms: f64) -> Self {
        Self {
            last_speed_up_ms: now_ms,
            last_score_checkpoint: 0.0,
        }
    }

    pub fn apply(
        &mut self,
        speed: &mut f32,
        score: f32,
        now_ms: f64,
        tuning: &Tuning,
        arena: &Arena,
    ) -> RampFired {
        let mut fired = RampFired::default();

        if now_ms - self.last_speed_up_ms >= tuning.speed_up_interval_ms {
            *speed += arena.speed_increment;
            self.last_speed_up_ms = now_ms;
            fired.time = true;
        }

        if tuning.score_checkpoint > 0.0 && score >= self.last_score_checkpoint + tuning.score_checkpoint {
            *speed *= tuning.score_speed_multiplier;
            self.last_score_checkpoint += tuning.score_checkpoint;
            fired.score = true;
        }

        fired
    }
}

/// What the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub player: Rect,
    pub pose: Pose,
    pub entities: Vec<Entity>,
    pub ground_y: f32,
    pub score: u32,
    pub health: u32,
    pub max_health: u32,
    pub invincible: bool,
    pub paused: bool,
    pub game_over: bool,
    /// Inset hitboxes (player first) when debug drawing is on
    pub hitboxes: Option<Vec<Rect>>,
}

/// Complete mutable world state for one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub tuning: Tuning,
    pub arena: Arena,
    pub phase: GamePhase,
    pub player: Player,
    /// Live entities in spawn order
    pub entities: Vec<Entity>,
    /// Fractional score; displayed and recorded floored
    pub score: f32,
    pub health: u32,
    /// Speed handed to newly spawned entities
    pub obstacle_speed: f32,
    pub ramp: DifficultyRamp,
    pub spawners: [Spawner; 3],
    /// Expose hitboxes in snapshots
    pub show_hitboxes: bool,
    /// Clock reading at the most recent step
    pub now_ms: f64,
    pub(crate) rng: Pcg32,
    events: Vec<SimEvent>,
    next_id: u32,
}

impl RunState {
    /// Start a fresh run at `now_ms`
    pub fn new(viewport: Viewport, tuning: Tuning, seed: u64, now_ms: f64) -> Self {
        let arena = Arena::new(viewport, &tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        let spawners = [
            Spawner::new(SpawnKind::Obstacle, tuning.obstacle_spawn, now_ms, &mut rng),
            Spawner::new(SpawnKind::Plane, tuning.plane_spawn, now_ms, &mut rng),
            Spawner::new(SpawnKind::PowerUp, tuning.power_up_spawn, now_ms, &mut rng),
        ];
        log::info!(
            "New run: {}x{} scale {:.2}, seed {}",
            viewport.width,
            viewport.height,
            viewport.scale,
            seed
        );

        Self {
            player: Player::new(arena.player_x, arena.player_ground_top(), arena.player_size, now_ms),
            phase: GamePhase::Running,
            entities: Vec::new(),
            score: 0.0,
            health: tuning.max_health,
            obstacle_speed: arena.base_speed,
            ramp: DifficultyRamp::new(now_ms),
            spawners,
            show_hitboxes: false,
            now_ms,
            rng,
            events: Vec::new(),
            next_id: 1,
            tuning,
            arena,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an entity to the world
    pub fn spawn(&mut self, kind: EntityKind) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind));
        id
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Score as shown to the player and recorded on the leaderboard
    pub fn final_score(&self) -> u32 {
        self.score.max(0.0).floor() as u32
    }

    pub fn is_invincible(&self) -> bool {
        self.player.invincibility.is_active(self.now_ms)
    }

    /// Jump or double jump; ignored unless running
    pub fn jump(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }
        if self
            .player
            .jump(self.arena.jump_force, self.tuning.double_jump_ratio)
        {
            self.emit(SimEvent::Jumped);
        }
    }

    /// Running ↔ Paused; no effect after game over
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                self.emit(SimEvent::Paused);
                log::info!("Game paused");
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                self.emit(SimEvent::Resumed);
                log::info!("Game resumed");
            }
            GamePhase::GameOver => {}
        }
    }

    /// Reset every run field and restart the spawners
    pub fn restart(&mut self, now_ms: f64) {
        self.phase = GamePhase::Running;
        self.player = Player::new(
            self.arena.player_x,
            self.arena.player_ground_top(),
            self.arena.player_size,
            now_ms,
        );
        self.entities.clear();
        self.score = 0.0;
        self.health = self.tuning.max_health;
        self.obstacle_speed = self.arena.base_speed;
        self.ramp = DifficultyRamp::new(now_ms);
        for spawner in &mut self.spawners {
            spawner.start(now_ms, &mut self.rng);
        }
        self.now_ms = now_ms;
        self.next_id = 1;
        self.emit(SimEvent::Restarted);
        log::info!("Game restarted");
    }

    /// Rebuild scaled metrics for a new viewport and re-seat the player
    pub fn resize(&mut self, viewport: Viewport) {
        let old_scale = self.arena.viewport.scale;
        self.arena = Arena::new(viewport, &self.tuning);
        if old_scale > 0.0 {
            self.obstacle_speed *= viewport.scale / old_scale;
        } else {
            // Nothing spawned on a zero-size viewport can move or be seen
            self.obstacle_speed = self.arena.base_speed;
            self.entities.clear();
            log::debug!("Resized from an empty viewport, obstacle speed reset");
        }

        let player = &mut self.player;
        player.size = self.arena.player_size;
        player.pos = Vec2::new(self.arena.player_x, self.arena.player_ground_top());
        player.velocity_y = 0.0;
        player.is_jumping = false;
        player.can_double_jump = false;
        log::info!(
            "Resized to {}x{} (scale {:.2})",
            viewport.width,
            viewport.height,
            viewport.scale
        );
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        let hitboxes = self.show_hitboxes.then(|| {
            let table = &self.tuning.hitboxes;
            std::iter::once(self.player.hitbox(&table.player))
                .chain(
                    self.entities
                        .iter()
                        .flat_map(|e| e.bodies().iter().map(|b| b.hitbox(table))),
                )
                .collect()
        });

        Snapshot {
            player: self.player.rect(),
            pose: self.player.pose(),
            entities: self.entities.clone(),
            ground_y: self.arena.ground_y,
            score: self.final_score(),
            health: self.health,
            max_health: self.tuning.max_health,
            invincible: self.is_invincible(),
            paused: self.phase == GamePhase::Paused,
            game_over: self.is_game_over(),
            hitboxes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Body, HitboxKind};
    use crate::sim::tick::step;

    fn state() -> RunState {
        RunState::new(Viewport::fit(1200.0, 800.0), Tuning::default(), 42, 0.0)
    }

    #[test]
    fn test_new_run_defaults() {
        let state = state();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.health, 3);
        assert_eq!(state.final_score(), 0);
        assert!(state.entities.is_empty());
        assert!(state.spawners.iter().all(Spawner::is_active));
        assert_eq!(state.player.pos.y, 600.0);
        assert_eq!(state.player.pos.x, 240.0);
    }

    #[test]
    fn test_score_checkpoint_fires_once() {
        let tuning = Tuning::default();
        let arena = Arena::new(Viewport::fit(1200.0, 800.0), &tuning);
        let mut ramp = DifficultyRamp::new(0.0);
        let mut speed = 4.0;

        assert_eq!(ramp.apply(&mut speed, 299.0, 16.0, &tuning, &arena), RampFired::default());
        let fired = ramp.apply(&mut speed, 300.0, 32.0, &tuning, &arena);
        assert!(fired.score);
        assert!((speed - 4.8).abs() < 1e-5);

        // Score sits at or above 300 for many frames: no further multiplier
        for frame in 0..100 {
            let fired = ramp.apply(&mut speed, 300.5, 48.0 + frame as f64, &tuning, &arena);
            assert!(!fired.score);
        }
        assert!((speed - 4.8).abs() < 1e-5);
        assert_eq!(ramp.last_score_checkpoint, 300.0);
    }

    #[test]
    fn test_time_ramp_every_interval() {
        let tuning = Tuning::default();
        let arena = Arena::new(Viewport::fit(1200.0, 800.0), &tuning);
        let mut ramp = DifficultyRamp::new(0.0);
        let mut speed = 4.0;

        assert!(!ramp.apply(&mut speed, 0.0, 24_999.0, &tuning, &arena).time);
        assert!(ramp.apply(&mut speed, 0.0, 25_000.0, &tuning, &arena).time);
        assert!(!ramp.apply(&mut speed, 0.0, 25_001.0, &tuning, &arena).time);
        assert!(ramp.apply(&mut speed, 0.0, 50_000.0, &tuning, &arena).time);
        assert!((speed - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_pause_toggle_and_game_over_ignores_it() {
        let mut state = state();
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Paused);
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.drain_events(), vec![SimEvent::Paused, SimEvent::Resumed]);

        state.phase = GamePhase::GameOver;
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_jump_ignored_unless_running() {
        let mut state = state();
        state.toggle_pause();
        state.jump();
        assert!(!state.player.is_jumping);

        state.toggle_pause();
        state.jump();
        assert!(state.player.is_jumping);
        assert_eq!(state.drain_events().last(), Some(&SimEvent::Jumped));
    }

    #[test]
    fn test_resize_reseats_player_and_rescales_speed() {
        let mut state = state();
        state.jump();
        state.resize(Viewport::fit(800.0, 400.0));
        assert_eq!(state.arena.viewport.scale, 0.5);
        assert_eq!(state.player.size, 50.0);
        assert_eq!(state.player.pos.y, 400.0 - 50.0 - 50.0);
        assert!(!state.player.is_jumping);
        assert!((state.obstacle_speed - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_from_empty_viewport_restores_speed() {
        let mut state = RunState::new(Viewport::fit(0.0, 0.0), Tuning::default(), 42, 0.0);
        assert_eq!(state.obstacle_speed, 0.0);
        state.spawn(EntityKind::Ground(Body::new(
            Vec2::new(100.0, 0.0),
            Vec2::ZERO,
            0.0,
            HitboxKind::Ground,
        )));

        state.resize(Viewport::fit(1200.0, 800.0));
        assert!((state.obstacle_speed - 4.0).abs() < 1e-5);
        assert!(state.entities.is_empty(), "stationary leftovers dropped");

        // Invincible run long enough for several spawns
        state.player.invincibility.grant(0.0, 1e9);
        let mut t = 0.0;
        for _ in 0..600 {
            t += 16.67;
            step(&mut state, 16.67, t);
        }
        assert!(!state.entities.is_empty());
        assert!(state.entities.iter().all(|e| e.bodies().iter().all(|b| b.speed > 0.0)));
        assert!(state.entities.iter().any(|e| e.bodies()[0].pos.x < state.arena.spawn_x));
    }

    #[test]
    fn test_snapshot_hitboxes_only_in_debug() {
        let mut state = state();
        assert!(state.snapshot().hitboxes.is_none());
        state.show_hitboxes = true;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.hitboxes.map(|h| h.len()), Some(1));
        assert_eq!(snapshot.max_health, 3);
    }
}
