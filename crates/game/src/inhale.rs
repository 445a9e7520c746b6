//! Inhale targeting and the suck-in animation of a captured enemy.

use engine_core::{BeingConsumed, Transform, Vec3, Velocity};
use hecs::Entity;

use crate::config::PlayerTunables;
use crate::registry::EntityRegistry;

/// Timed interpolation of a captured enemy toward the player's mouth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuckIn {
    pub start_time: f32,
    pub start_pos: Vec3,
    pub start_scale: Vec3,
}

/// First active enemy, in spawn order, inside the inhale cone.
///
/// An enemy qualifies when its distance from `origin` lies strictly between
/// `inhale_min_distance` and `inhale_range` and the angle to it from
/// `forward` is inside the half-angle.
pub fn find_target(registry: &EntityRegistry, origin: Vec3, forward: Vec3, tunables: &PlayerTunables) -> Option<Entity> {
    let forward = forward.normalize_or_zero();
    let cos_limit = tunables.inhale_cos();
    registry.active_enemies().into_iter().find(|&e| {
        let Some(pos) = registry.position(e) else {
            return false;
        };
        let to_target = pos - origin;
        let distance = to_target.length();
        if !(distance < tunables.inhale_range && distance > tunables.inhale_min_distance) {
            return false;
        }
        forward.dot(to_target / distance) > cos_limit
    })
}

/// Tag `enemy` as consumed and start its suck-in at `now`.
pub fn capture(registry: &mut EntityRegistry, enemy: Entity, now: f32) -> bool {
    if !registry.is_live(enemy) {
        return false;
    }
    let Ok((transform, velocity)) = registry
        .world_mut()
        .query_one_mut::<(&Transform, &mut Velocity)>(enemy)
    else {
        return false;
    };
    velocity.linear = Vec3::ZERO;
    let suck = SuckIn {
        start_time: now,
        start_pos: transform.position,
        start_scale: transform.scale,
    };
    registry.world_mut().insert(enemy, (BeingConsumed, suck)).is_ok()
}

/// Where a suck-in currently stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuckInStatus {
    /// The target disappeared; nothing left to animate.
    Lost,
    InProgress,
    Finished,
}

/// Advance the suck-in of `enemy` toward `mouth`. Checks the target still
/// exists before touching it.
pub fn advance_suck_in(
    registry: &mut EntityRegistry,
    enemy: Entity,
    mouth: Vec3,
    now: f32,
    tunables: &PlayerTunables,
) -> SuckInStatus {
    if !registry.is_live(enemy) {
        return SuckInStatus::Lost;
    }
    let Ok((transform, suck)) = registry
        .world_mut()
        .query_one_mut::<(&mut Transform, &SuckIn)>(enemy)
    else {
        return SuckInStatus::Lost;
    };

    let progress = ((now - suck.start_time) / tunables.suck_in_duration).clamp(0.0, 1.0);
    transform.position = suck.start_pos.lerp(mouth, progress);
    transform.scale = suck.start_scale.lerp(Vec3::splat(tunables.suck_in_end_scale), progress);

    if progress >= 1.0 {
        SuckInStatus::Finished
    } else {
        SuckInStatus::InProgress
    }
}
