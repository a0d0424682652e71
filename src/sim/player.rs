//! Player physics body, jump state machine and run-cycle animation

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{HitboxInset, Rect};
use crate::tuning::Tuning;

/// Peak rise of a single jump: v² / 2g
///
/// `jump_force` is negative (up is -y), so only its magnitude matters.
pub fn max_jump_height(jump_force: f32, gravity: f32) -> f32 {
    jump_force * jump_force / (2.0 * gravity)
}

/// Which sprite sequence the renderer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pose {
    Walking { frame: u8 },
    Jumping { frame: u8 },
}

/// Wall-clock driven frame counters for the walk and jump cycles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAnimation {
    pub walk_frame: u8,
    pub jump_frame: u8,
    last_walk_change_ms: f64,
    last_jump_change_ms: f64,
}

impl RunAnimation {
    pub fn new(now_ms: f64) -> Self {
        Self {
            walk_frame: 0,
            jump_frame: 0,
            last_walk_change_ms: now_ms,
            last_jump_change_ms: now_ms,
        }
    }

    /// Advance whichever cycle matches the current airborne state
    pub fn update(&mut self, airborne: bool, now_ms: f64, timing: &AnimationTiming) {
        if airborne {
            if now_ms - self.last_jump_change_ms >= timing.jump_frame_ms {
                self.jump_frame = (self.jump_frame + 1) % timing.jump_frames.max(1);
                self.last_jump_change_ms = now_ms;
            }
        } else if now_ms - self.last_walk_change_ms >= timing.walk_frame_ms {
            self.walk_frame = (self.walk_frame + 1) % timing.walk_frames.max(1);
            self.last_walk_change_ms = now_ms;
        }
    }
}

/// Frame counts and durations for [`RunAnimation`]
#[derive(Debug, Clone, Copy)]
pub struct AnimationTiming {
    pub walk_frames: u8,
    pub walk_frame_ms: f64,
    pub jump_frames: u8,
    pub jump_frame_ms: f64,
}

impl From<&Tuning> for AnimationTiming {
    fn from(tuning: &Tuning) -> Self {
        Self {
            walk_frames: tuning.walk_frames,
            walk_frame_ms: tuning.walk_frame_ms,
            jump_frames: tuning.jump_frames,
            jump_frame_ms: tuning.jump_frame_ms,
        }
    }
}

/// Timestamp-bounded damage immunity
///
/// Expiry is an absolute wall-clock deadline, so it is unaffected by frame
/// rate and needs no per-frame countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Invincibility {
    pub expires_at_ms: Option<f64>,
}

impl Invincibility {
    pub fn is_active(&self, now_ms: f64) -> bool {
        self.expires_at_ms.is_some_and(|t| now_ms < t)
    }

    /// Start or extend the window; never shortens an existing one
    pub fn grant(&mut self, now_ms: f64, duration_ms: f64) {
        let until = now_ms + duration_ms;
        self.expires_at_ms = Some(self.expires_at_ms.map_or(until, |t| t.max(until)));
    }

    /// Drop a lapsed deadline
    pub fn expire(&mut self, now_ms: f64) {
        if !self.is_active(now_ms) {
            self.expires_at_ms = None;
        }
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// Sprite edge length (the sprite is square)
    pub size: f32,
    /// Positive is downward
    pub velocity_y: f32,
    pub is_jumping: bool,
    /// Only meaningful while `is_jumping`
    pub can_double_jump: bool,
    pub invincibility: Invincibility,
    pub animation: RunAnimation,
}

impl Player {
    /// A grounded player standing with its feet on `ground_top + size`
    pub fn new(x: f32, ground_top: f32, size: f32, now_ms: f64) -> Self {
        Self {
            pos: Vec2::new(x, ground_top),
            size,
            velocity_y: 0.0,
            is_jumping: false,
            can_double_jump: false,
            invincibility: Invincibility::default(),
            animation: RunAnimation::new(now_ms),
        }
    }

    /// Integrate one frame of gravity, then clamp to the ground
    ///
    /// `ground_top` is the highest `y` the player's top edge may sit at while
    /// standing (`ground_y - size`). Returns true if the player landed.
    pub fn apply_gravity(&mut self, factor: f32, gravity: f32, ground_top: f32) -> bool {
        self.velocity_y += gravity * factor;
        self.pos.y += self.velocity_y * factor;

        if self.pos.y > ground_top {
            let landed = self.is_jumping;
            self.pos.y = ground_top;
            self.velocity_y = 0.0;
            self.is_jumping = false;
            self.can_double_jump = false;
            return landed;
        }
        false
    }

    /// Jump, or double jump if airborne and the second jump is unspent
    ///
    /// Returns true if the velocity changed; a spent double jump is a no-op.
    pub fn jump(&mut self, jump_force: f32, double_jump_ratio: f32) -> bool {
        if !self.is_jumping {
            self.velocity_y = jump_force;
            self.is_jumping = true;
            self.can_double_jump = true;
            true
        } else if self.can_double_jump {
            self.velocity_y = jump_force * double_jump_ratio;
            self.can_double_jump = false;
            true
        } else {
            false
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Vec2::splat(self.size))
    }

    pub fn hitbox(&self, inset: &HitboxInset) -> Rect {
        self.rect().inset(inset)
    }

    pub fn pose(&self) -> Pose {
        if self.is_jumping {
            Pose::Jumping {
                frame: self.animation.jump_frame,
            }
        } else {
            Pose::Walking {
                frame: self.animation.walk_frame,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GROUND_TOP: f32 = 600.0;

    fn grounded() -> Player {
        Player::new(160.0, GROUND_TOP, 100.0, 0.0)
    }

    #[test]
    fn test_max_jump_height() {
        assert!((max_jump_height(-15.0, 0.5) - 225.0).abs() < 1e-4);
        assert!((max_jump_height(-15.0, 0.5) * 1.2 - 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_triple_jump_changes_velocity_twice() {
        let mut player = grounded();
        assert!(player.jump(-16.0, 0.8));
        assert_eq!(player.velocity_y, -16.0);
        assert!(player.can_double_jump);

        assert!(player.jump(-16.0, 0.8));
        assert!((player.velocity_y - -12.8).abs() < 1e-5);
        assert!(!player.can_double_jump);

        assert!(!player.jump(-16.0, 0.8));
        assert!((player.velocity_y - -12.8).abs() < 1e-5);
    }

    #[test]
    fn test_landing_resets_jump_state() {
        let mut player = grounded();
        player.jump(-16.0, 0.8);

        let mut landed = false;
        for _ in 0..200 {
            landed |= player.apply_gravity(1.0, 0.6, GROUND_TOP);
        }
        assert!(landed);
        assert_eq!(player.pos.y, GROUND_TOP);
        assert!(!player.is_jumping);
        assert!(!player.can_double_jump);
        // First jump is available again
        assert!(player.jump(-16.0, 0.8));
    }

    #[test]
    fn test_standing_player_stays_put() {
        let mut player = grounded();
        assert!(!player.apply_gravity(1.0, 0.6, GROUND_TOP));
        assert_eq!(player.pos.y, GROUND_TOP);
        assert_eq!(player.velocity_y, 0.0);
    }

    #[test]
    fn test_invincibility_window_is_half_open() {
        let mut inv = Invincibility::default();
        assert!(!inv.is_active(0.0));
        inv.grant(0.0, 3000.0);
        assert!(inv.is_active(2999.0));
        assert!(!inv.is_active(3000.0));
    }

    #[test]
    fn test_invincibility_never_shortened() {
        let mut inv = Invincibility::default();
        inv.grant(0.0, 3000.0);
        inv.grant(500.0, 1000.0);
        assert_eq!(inv.expires_at_ms, Some(3000.0));
        inv.grant(2500.0, 3000.0);
        assert_eq!(inv.expires_at_ms, Some(5500.0));

        inv.expire(5000.0);
        assert!(inv.expires_at_ms.is_some());
        inv.expire(5500.0);
        assert_eq!(inv.expires_at_ms, None);
    }

    #[test]
    fn test_animation_cycles_follow_airborne_state() {
        let timing = AnimationTiming {
            walk_frames: 6,
            walk_frame_ms: 150.0,
            jump_frames: 8,
            jump_frame_ms: 100.0,
        };
        let mut anim = RunAnimation::new(0.0);
        anim.update(false, 149.0, &timing);
        assert_eq!(anim.walk_frame, 0);
        anim.update(false, 150.0, &timing);
        assert_eq!(anim.walk_frame, 1);
        anim.update(true, 150.0, &timing);
        assert_eq!(anim.jump_frame, 1, "jump timer ran since creation");
        assert_eq!(anim.walk_frame, 1);

        for i in 1..=6 {
            anim.update(false, 150.0 + 150.0 * i as f64, &timing);
        }
        assert_eq!(anim.walk_frame, 1, "wrapped around six frames");
    }

    proptest! {
        #[test]
        fn ground_clamp_holds(
            y in 0.0f32..GROUND_TOP,
            velocity in -30.0f32..60.0,
            factor in 0.0f32..4.0,
        ) {
            let mut player = grounded();
            player.pos.y = y;
            player.velocity_y = velocity;
            player.is_jumping = true;
            player.can_double_jump = true;

            let next_v = velocity + 0.6 * factor;
            let next_y = y + next_v * factor;
            player.apply_gravity(factor, 0.6, GROUND_TOP);

            if next_y > GROUND_TOP {
                prop_assert_eq!(player.pos.y, GROUND_TOP);
                prop_assert_eq!(player.velocity_y, 0.0);
                prop_assert!(!player.is_jumping);
                prop_assert!(!player.can_double_jump);
            }
            prop_assert!(player.pos.y <= GROUND_TOP);
        }

        #[test]
        fn double_jump_budget(force in -30.0f32..-1.0, ratio in 0.1f32..1.0) {
            let mut player = grounded();
            let changes = (0..3).filter(|_| player.jump(force, ratio)).count();
            prop_assert_eq!(changes, 2);
        }
    }
}
