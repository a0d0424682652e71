//! Scrolling world entities
//!
//! One tagged representation for everything that scrolls past the player.
//! Each entity owns one or two [`Body`] rectangles and carries its own
//! horizontal speed, captured when it was spawned.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{HitboxInset, Rect};
use crate::tuning::HitboxTuning;

/// Which inset configuration a body collides with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitboxKind {
    Ground,
    Overhead,
    Plane,
    PowerUp,
}

impl HitboxKind {
    pub fn inset(self, hitboxes: &HitboxTuning) -> HitboxInset {
        match self {
            HitboxKind::Ground => hitboxes.ground,
            HitboxKind::Overhead => hitboxes.overhead,
            HitboxKind::Plane => hitboxes.plane,
            HitboxKind::PowerUp => hitboxes.power_up,
        }
    }
}

/// Vertical oscillation around the spawn height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bob {
    pub base_y: f32,
    /// Current displacement from `base_y`, within `[-range, range]`
    pub offset: f32,
    pub range: f32,
    /// px per reference tick
    pub speed: f32,
    pub moving_up: bool,
}

impl Bob {
    /// Starts at `base_y`, heading up
    pub fn new(base_y: f32, range: f32, speed: f32) -> Self {
        Self {
            base_y,
            offset: 0.0,
            range,
            speed,
            moving_up: true,
        }
    }

    /// Move along the oscillation and return the new top edge
    pub fn advance(&mut self, factor: f32) -> f32 {
        if self.moving_up {
            self.offset = (self.offset - self.speed * factor).max(-self.range);
            if self.offset <= -self.range {
                self.moving_up = false;
            }
        } else {
            self.offset = (self.offset + self.speed * factor).min(self.range);
            if self.offset >= self.range {
                self.moving_up = true;
            }
        }
        self.base_y + self.offset
    }
}

/// A single moving rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Leftward speed in px per reference tick (always > 0)
    pub speed: f32,
    pub hitbox: HitboxKind,
    /// Cosmetic sprite variant, ignored by collision
    pub sprite: u8,
    /// Set on bobbing obstacles
    #[serde(default)]
    pub bob: Option<Bob>,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, speed: f32, hitbox: HitboxKind) -> Self {
        Self {
            pos,
            size,
            speed,
            hitbox,
            sprite: 0,
            bob: None,
        }
    }

    pub fn with_sprite(mut self, sprite: u8) -> Self {
        self.sprite = sprite;
        self
    }

    /// Oscillate vertically by up to `range` around the current height
    pub fn with_bob(mut self, range: f32, speed: f32) -> Self {
        self.bob = Some(Bob::new(self.pos.y, range, speed));
        self
    }

    /// Full sprite rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Collidable interior
    pub fn hitbox(&self, hitboxes: &HitboxTuning) -> Rect {
        self.rect().inset(&self.hitbox.inset(hitboxes))
    }

    pub fn advance(&mut self, factor: f32) {
        if let Some(bob) = &mut self.bob {
            self.pos.y = bob.advance(factor);
        }
        self.pos.x -= self.speed * factor;
    }

    #[inline]
    pub fn off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// Entity variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Lone ground-anchored obstacle
    Ground(Body),
    /// Ground obstacle (`[0]`) plus an overhead obstacle (`[1]`) above a
    /// clearable gap; moves and is pruned as one unit
    Gate([Body; 2]),
    /// Airborne obstacle
    Plane(Body),
    /// Invincibility pickup
    PowerUp { body: Body, collected: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind) -> Self {
        Self { id, kind }
    }

    pub fn bodies(&self) -> &[Body] {
        match &self.kind {
            EntityKind::Ground(body) | EntityKind::Plane(body) => std::slice::from_ref(body),
            EntityKind::PowerUp { body, .. } => std::slice::from_ref(body),
            EntityKind::Gate(pair) => pair,
        }
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        match &mut self.kind {
            EntityKind::Ground(body) | EntityKind::Plane(body) => std::slice::from_mut(body),
            EntityKind::PowerUp { body, .. } => std::slice::from_mut(body),
            EntityKind::Gate(pair) => pair,
        }
    }

    /// Scroll every body left by its own speed
    pub fn advance(&mut self, factor: f32) {
        for body in self.bodies_mut() {
            body.advance(factor);
        }
    }

    /// True once every body has fully left the screen
    pub fn off_screen(&self) -> bool {
        self.bodies().iter().all(Body::off_screen)
    }

    /// Obstacles damage the player; pickups do not
    pub fn is_hazard(&self) -> bool {
        !matches!(self.kind, EntityKind::PowerUp { .. })
    }

    pub fn is_collected(&self) -> bool {
        matches!(self.kind, EntityKind::PowerUp { collected: true, .. })
    }

    /// Removed on the next prune pass
    pub fn should_prune(&self) -> bool {
        self.off_screen() || self.is_collected()
    }
}
