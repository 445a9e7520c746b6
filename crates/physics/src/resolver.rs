//! Axis-separated movement resolution.
//!
//! X and Z are tested independently against the mover's pre-move box,
//! each swept along its own axis only, so a mover approaching a wall at an
//! angle keeps sliding on the free axis. Y is handled as a plain clamp
//! between the ground and an optional ceiling.
//!
//! The sweep is not corner-exact: when both single-axis sweeps are clear
//! the combined diagonal move can clip the corner of an obstacle by a
//! sliver. That is accepted behaviour, not something to patch here.

use engine_core::Vec3;

use crate::{Aabb, SpatialWorld};

/// Vertical range the mover's centre may occupy this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalLimits {
    /// Centre height when resting on the ground.
    pub ground: f32,
    /// Highest centre height allowed, if any (set while flying).
    pub ceiling: Option<f32>,
}

impl VerticalLimits {
    pub fn ground(ground: f32) -> Self {
        Self { ground, ceiling: None }
    }

    pub fn with_ceiling(ground: f32, ceiling: f32) -> Self {
        Self {
            ground,
            ceiling: Some(ceiling),
        }
    }
}

/// Outcome of resolving one desired displacement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Resolution {
    /// Displacement to actually apply.
    pub applied: Vec3,
    pub blocked_x: bool,
    pub blocked_z: bool,
    /// The mover ended on the ground (snapped or already resting there).
    pub grounded: bool,
    /// The mover was stopped by the ceiling.
    pub capped: bool,
}

impl Resolution {
    /// Apply to a position and velocity: moves the position and zeroes the
    /// velocity components that were stopped.
    pub fn apply(&self, position: &mut Vec3, velocity: &mut Vec3) {
        *position += self.applied;
        if self.blocked_x {
            velocity.x = 0.0;
        }
        if self.blocked_z {
            velocity.z = 0.0;
        }
        if self.grounded || self.capped {
            velocity.y = 0.0;
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked_x || self.blocked_z
    }
}

/// Resolve `desired` for a mover whose current box is `aabb` and whose
/// centre sits at `position_y`.
///
/// Static obstacles come from `world`; `dynamic` holds boxes of other
/// entities that block this mover. A zero displacement on an axis never
/// runs a collision test for that axis.
pub fn resolve(
    aabb: &Aabb,
    position_y: f32,
    desired: Vec3,
    world: &SpatialWorld,
    dynamic: &[Aabb],
    limits: VerticalLimits,
) -> Resolution {
    let desired = Vec3::new(finite_or_zero(desired.x), finite_or_zero(desired.y), finite_or_zero(desired.z));
    let blocked = |offset: Vec3| {
        let swept = aabb.swept(offset);
        world.intersects_any(&swept) || dynamic.iter().any(|d| d.intersects(&swept))
    };

    let mut res = Resolution::default();

    if desired.x != 0.0 {
        if blocked(Vec3::new(desired.x, 0.0, 0.0)) {
            log::debug!("Resolver: X blocked ({:+.3})", desired.x);
            res.blocked_x = true;
        } else {
            res.applied.x = desired.x;
        }
    }

    if desired.z != 0.0 {
        if blocked(Vec3::new(0.0, 0.0, desired.z)) {
            log::debug!("Resolver: Z blocked ({:+.3})", desired.z);
            res.blocked_z = true;
        } else {
            res.applied.z = desired.z;
        }
    }

    let mut new_y = position_y + desired.y;
    if new_y < limits.ground || (desired.y <= 0.0 && new_y <= limits.ground) {
        new_y = limits.ground;
        res.grounded = true;
    } else if let Some(ceiling) = limits.ceiling {
        if desired.y > 0.0 && new_y >= ceiling {
            // Never pull a mover that is already above the ceiling down.
            new_y = ceiling.max(position_y);
            res.capped = true;
        }
    }
    res.applied.y = new_y - position_y;

    res
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
