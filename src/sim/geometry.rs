//! Axis-aligned rectangles and hitbox insets
//!
//! Screen space: x grows right, y grows down. A rectangle is anchored at its
//! top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Inclusive overlap test: rectangles that merely touch count as a hit
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom())
    }

    /// Shrink to the collidable interior described by `inset`
    pub fn inset(&self, inset: &HitboxInset) -> Rect {
        Rect {
            pos: self.pos + self.size * Vec2::new(inset.x, inset.y),
            size: self.size * Vec2::new(inset.width, inset.height),
        }
    }
}

/// Fractions of a sprite's box that make up its lethal/collectible area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxInset {
    /// Left offset as a fraction of width
    pub x: f32,
    /// Top offset as a fraction of height
    pub y: f32,
    /// Hitbox width as a fraction of width
    pub width: f32,
    /// Hitbox height as a fraction of height
    pub height: f32,
}

impl HitboxInset {
    /// The full sprite rectangle
    pub const FULL: HitboxInset = HitboxInset::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
