//! Collision detection between the player and scrolling entities
//!
//! Sprites are drawn larger than their dangerous area, so both sides of every
//! test are shrunk by their hitbox inset before the AABB overlap check.

use super::entity::Entity;
use super::geometry::Rect;
use super::player::Player;
use crate::tuning::HitboxTuning;

/// A hazard that touched the player this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionResult {
    pub entity_id: u32,
}

/// True if any of the entity's bodies overlaps the player
pub fn check_collision(player: &Player, entity: &Entity, hitboxes: &HitboxTuning) -> bool {
    let player_box = player.hitbox(&hitboxes.player);
    overlaps_any(&player_box, entity, hitboxes)
}

fn overlaps_any(player_box: &Rect, entity: &Entity, hitboxes: &HitboxTuning) -> bool {
    entity
        .bodies()
        .iter()
        .any(|body| body.hitbox(hitboxes).overlaps(player_box))
}

/// First hazard touching the player, if any
///
/// Damage is resolved once per frame, so only the first hit matters.
pub fn first_hazard_hit(
    player: &Player,
    entities: &[Entity],
    hitboxes: &HitboxTuning,
) -> Option<CollisionResult> {
    let player_box = player.hitbox(&hitboxes.player);
    entities
        .iter()
        .filter(|e| e.is_hazard())
        .find(|e| overlaps_any(&player_box, e, hitboxes))
        .map(|e| CollisionResult { entity_id: e.id })
}

/// Indices of uncollected power-ups touching the player
pub fn power_up_hits(player: &Player, entities: &[Entity], hitboxes: &HitboxTuning) -> Vec<usize> {
    let player_box = player.hitbox(&hitboxes.player);
    entities
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_hazard() && !e.is_collected())
        .filter(|(_, e)| overlaps_any(&player_box, e, hitboxes))
        .map(|(i, _)| i)
        .collect()
}
