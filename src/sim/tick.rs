//! Per-frame simulation step
//!
//! The frame driver calls [`step`] once per rendered frame with the elapsed
//! time and the current clock reading. Displacements scale with the elapsed
//! time; spawn cooldowns, ramps and invincibility compare wall-clock stamps.

use super::collision::{first_hazard_hit, power_up_hits};
use super::entity::EntityKind;
use super::player::AnimationTiming;
use super::spawner;
use super::state::{GamePhase, RunState, SimEvent};
use crate::frame_factor;

/// Advance the run by one frame
pub fn step(state: &mut RunState, delta_ms: f32, now_ms: f64) {
    state.now_ms = now_ms;

    // Paused and finished runs are frozen
    if state.phase != GamePhase::Running {
        return;
    }

    let factor = frame_factor(delta_ms);

    // Player physics
    let ground_top = state.arena.player_ground_top();
    state
        .player
        .apply_gravity(factor, state.arena.gravity, ground_top);
    let timing = AnimationTiming::from(&state.tuning);
    let airborne = state.player.is_jumping;
    state.player.animation.update(airborne, now_ms, &timing);
    state.player.invincibility.expire(now_ms);

    // Spawners
    for i in 0..state.spawners.len() {
        if state.spawners[i].poll(now_ms, &mut state.rng) {
            let kind = spawner::build(
                state.spawners[i].kind,
                &state.arena,
                &state.tuning,
                state.obstacle_speed,
                &mut state.rng,
            );
            let id = state.spawn(kind);
            log::debug!("Spawned {:?} #{}", state.spawners[i].kind, id);
        }
    }

    // Difficulty
    let fired = state.ramp.apply(
        &mut state.obstacle_speed,
        state.score,
        now_ms,
        &state.tuning,
        &state.arena,
    );
    if fired.time || fired.score {
        log::info!(
            "Speed up ({}) -> obstacle speed {:.2}",
            if fired.score { "score" } else { "time" },
            state.obstacle_speed
        );
        let speed = state.obstacle_speed;
        state.emit(SimEvent::SpeedUp { speed });
    }

    // Scroll
    for entity in &mut state.entities {
        entity.advance(factor);
    }

    // Damage: at most one hit per frame
    if !state.player.invincibility.is_active(now_ms)
        && let Some(hit) = first_hazard_hit(&state.player, &state.entities, &state.tuning.hitboxes)
    {
        log::debug!("Player hit by #{}", hit.entity_id);
        resolve_damage(state, now_ms);
        if state.is_game_over() {
            return;
        }
    }

    // Pickups ignore invincibility
    for index in power_up_hits(&state.player, &state.entities, &state.tuning.hitboxes) {
        collect_power_up(state, index, now_ms);
    }

    state.entities.retain(|e| !e.should_prune());

    state.score += state.tuning.score_rate * factor;
}

/// Apply one point of damage unless invincible or already over
///
/// Returns true if health was lost.
pub fn resolve_damage(state: &mut RunState, now_ms: f64) -> bool {
    if state.is_game_over() || state.player.invincibility.is_active(now_ms) {
        return false;
    }

    state.health = state.health.saturating_sub(1);
    let health = state.health;
    state.emit(SimEvent::Hit { health });
    log::info!("Collision! Health: {}", health);

    if health == 0 {
        enter_game_over(state);
    } else {
        let grace = state.tuning.hit_grace_ms;
        state.player.invincibility.grant(now_ms, grace);
    }
    true
}

/// Mark the power-up at `index` collected and grant invincibility
pub fn collect_power_up(state: &mut RunState, index: usize, now_ms: f64) {
    let Some(entity) = state.entities.get_mut(index) else {
        return;
    };
    if let EntityKind::PowerUp { collected, .. } = &mut entity.kind {
        if *collected {
            return;
        }
        *collected = true;
    } else {
        return;
    }

    let duration = state.tuning.power_up_invincibility_ms;
    state.player.invincibility.grant(now_ms, duration);
    state.emit(SimEvent::PowerUpCollected);
    log::info!("Power-up collected, invincible for {} ms", duration);
}

/// Enter the terminal phase; repeated calls have no effect
pub fn enter_game_over(state: &mut RunState) {
    if state.is_game_over() {
        return;
    }
    state.phase = GamePhase::GameOver;
    for spawner in &mut state.spawners {
        spawner.stop();
    }
    let score = state.final_score();
    state.emit(SimEvent::GameOver { score });
    log::info!("Game over. Final score: {}", score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Body, HitboxKind};
    use crate::sim::state::Viewport;
    use crate::tuning::{SpawnTiming, Tuning};
    use glam::Vec2;

    const FRAME: f32 = 16.67;

    fn quiet_tuning() -> Tuning {
        // Spawners effectively never fire
        let never = SpawnTiming::new(1e12, 0.0, 0.0);
        Tuning {
            obstacle_spawn: never,
            plane_spawn: never,
            power_up_spawn: never,
            ..Default::default()
        }
    }

    fn state_with(tuning: Tuning) -> RunState {
        RunState::new(Viewport::fit(1200.0, 800.0), tuning, 7, 0.0)
    }

    /// An obstacle sitting right on top of the player
    fn obstacle_on_player(state: &RunState) -> EntityKind {
        let p = state.player.pos;
        EntityKind::Ground(Body::new(
            Vec2::new(p.x + 20.0, p.y + 20.0),
            Vec2::new(60.0, 60.0),
            0.0001,
            HitboxKind::Ground,
        ))
    }

    fn power_up_on_player(state: &RunState) -> EntityKind {
        let p = state.player.pos;
        EntityKind::PowerUp {
            body: Body::new(
                Vec2::new(p.x + 25.0, p.y + 25.0),
                Vec2::new(50.0, 50.0),
                0.0001,
                HitboxKind::PowerUp,
            ),
            collected: false,
        }
    }

    #[test]
    fn test_three_hits_spaced_past_grace_end_the_run() {
        let mut state = state_with(quiet_tuning());
        let mut healths = vec![state.health];

        for t in [0.0, 1500.0, 3000.0] {
            assert!(resolve_damage(&mut state, t));
            healths.push(state.health);
        }
        assert_eq!(healths, vec![3, 2, 1, 0]);
        assert!(state.is_game_over());
        assert!(state.spawners.iter().all(|s| !s.is_active()));
    }

    #[test]
    fn test_damage_after_game_over_is_ignored() {
        let mut state = state_with(quiet_tuning());
        for t in [0.0, 1500.0, 3000.0] {
            resolve_damage(&mut state, t);
        }
        let events = state.drain_events();
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, SimEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        assert!(!resolve_damage(&mut state, 10_000.0));
        enter_game_over(&mut state);
        assert_eq!(state.health, 0);
        assert!(state.drain_events().is_empty(), "no second score to persist");
    }

    #[test]
    fn test_grace_window_blocks_repeat_damage() {
        let mut state = state_with(quiet_tuning());
        assert!(resolve_damage(&mut state, 0.0));
        assert!(!resolve_damage(&mut state, 999.0));
        assert!(resolve_damage(&mut state, 1000.0));
        assert_eq!(state.health, 1);
    }

    #[test]
    fn test_power_up_invincibility_window() {
        let mut state = state_with(quiet_tuning());
        let kind = power_up_on_player(&state);
        state.spawn(kind);

        step(&mut state, 0.0, 0.0);
        assert!(state.entities.is_empty(), "collected power-up pruned");
        assert_eq!(state.player.invincibility.expires_at_ms, Some(3000.0));

        assert!(!resolve_damage(&mut state, 2000.0));
        assert_eq!(state.health, 3);
        assert!(resolve_damage(&mut state, 3500.0));
        assert_eq!(state.health, 2);
    }

    #[test]
    fn test_power_up_shields_stepped_collisions() {
        let mut state = state_with(quiet_tuning());
        let kind = power_up_on_player(&state);
        state.spawn(kind);
        step(&mut state, 0.0, 0.0);
        assert!(state.is_invincible());

        let kind = obstacle_on_player(&state);
        state.spawn(kind);

        step(&mut state, FRAME, 2000.0);
        assert_eq!(state.health, 3);
        assert!(!state.drain_events().iter().any(|e| matches!(e, SimEvent::Hit { .. })));

        step(&mut state, FRAME, 3500.0);
        assert_eq!(state.health, 2);
        assert!(state.drain_events().contains(&SimEvent::Hit { health: 2 }));
    }

    #[test]
    fn test_overlapping_obstacles_cost_one_health_per_frame() {
        let mut state = state_with(quiet_tuning());
        for _ in 0..3 {
            let kind = obstacle_on_player(&state);
            state.spawn(kind);
        }

        step(&mut state, FRAME, 16.0);
        assert_eq!(state.health, 2);

        // Still overlapping, but inside the grace window
        step(&mut state, FRAME, 32.0);
        step(&mut state, FRAME, 500.0);
        assert_eq!(state.health, 2);

        step(&mut state, FRAME, 1016.0);
        assert_eq!(state.health, 1);
    }

    #[test]
    fn test_game_over_freezes_the_world() {
        let mut state = state_with(Tuning {
            max_health: 1,
            ..quiet_tuning()
        });
        let kind = obstacle_on_player(&state);
        state.spawn(kind);

        step(&mut state, FRAME, 16.0);
        assert!(state.is_game_over());
        let frozen_x = state.entities[0].bodies()[0].pos.x;
        let frozen_score = state.score;

        step(&mut state, FRAME * 10.0, 5000.0);
        assert_eq!(state.entities[0].bodies()[0].pos.x, frozen_x);
        assert_eq!(state.score, frozen_score);
    }

    #[test]
    fn test_off_screen_entities_pruned_for_good() {
        let mut state = state_with(quiet_tuning());
        state.spawn(EntityKind::Ground(Body::new(
            Vec2::new(-40.0, 100.0),
            Vec2::new(45.0, 60.0),
            10.0,
            HitboxKind::Ground,
        )));
        let id = state.entities[0].id;

        step(&mut state, FRAME, 16.0);
        assert!(state.entities.is_empty());
        for i in 2..20 {
            step(&mut state, FRAME, 16.0 * i as f64);
            assert!(state.entities.iter().all(|e| e.id != id));
        }
    }

    #[test]
    fn test_restart_is_idempotent() {
        let mut state = state_with(Tuning::default());
        let mut t = 0.0;
        for _ in 0..600 {
            t += FRAME as f64;
            step(&mut state, FRAME, t);
            state.jump();
        }
        resolve_damage(&mut state, t);

        state.restart(t);
        let once = state.snapshot();
        let health = state.health;
        state.restart(t);
        let twice = state.snapshot();

        assert_eq!(once, twice);
        assert_eq!(state.health, health);
        assert_eq!(state.health, state.tuning.max_health);
        assert!(state.entities.is_empty());
        assert_eq!(state.final_score(), 0);
        assert!(state.spawners.iter().all(|s| s.is_active() && s.last_spawn_ms() == t));
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_spawners_populate_the_world() {
        let mut state = state_with(Tuning::default());
        let mut t = 0.0;
        let mut seen_plane = false;
        let mut seen_power_up = false;
        let mut seen_obstacle = false;
        // Twelve seconds of invincible play
        state.player.invincibility.grant(0.0, 1e9);
        for _ in 0..720 {
            t += FRAME as f64;
            step(&mut state, FRAME, t);
            for e in &state.entities {
                match e.kind {
                    EntityKind::Plane(_) => seen_plane = true,
                    EntityKind::PowerUp { .. } => seen_power_up = true,
                    EntityKind::Ground(_) | EntityKind::Gate(_) => seen_obstacle = true,
                }
            }
        }
        assert!(seen_obstacle);
        assert!(seen_plane, "plane cooldown is at most 8 s");
        assert!(seen_power_up, "power-up cooldown is at most 10 s");
        assert!(state.final_score() > 0);
    }

    #[test]
    fn test_existing_entities_keep_spawn_speed() {
        let mut state = state_with(quiet_tuning());
        state.spawn(EntityKind::Ground(Body::new(
            Vec2::new(1000.0, 100.0),
            Vec2::new(45.0, 60.0),
            4.0,
            HitboxKind::Ground,
        )));

        // Jump the score past the first checkpoint
        state.score = 300.0;
        step(&mut state, FRAME, 16.0);
        assert!((state.obstacle_speed - 4.8).abs() < 1e-4);
        assert_eq!(state.entities[0].bodies()[0].speed, 4.0);
        assert!(state.drain_events().contains(&SimEvent::SpeedUp { speed: state.obstacle_speed }));
    }

    #[test]
    fn test_paused_run_does_not_advance() {
        let mut state = state_with(quiet_tuning());
        state.jump();
        state.toggle_pause();
        let y = state.player.pos.y;
        step(&mut state, FRAME, 100.0);
        assert_eq!(state.player.pos.y, y);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.now_ms, 100.0);
    }

    #[test]
    fn test_score_scales_with_elapsed_time() {
        let mut state = state_with(quiet_tuning());
        step(&mut state, FRAME * 2.0, 33.0);
        assert!((state.score - 0.6).abs() < 1e-4);
        step(&mut state, 0.0, 33.0);
        assert!((state.score - 0.6).abs() < 1e-4);
    }
}
