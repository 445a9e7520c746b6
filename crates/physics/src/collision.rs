//! Collider component linking an entity's transform to its bounding box.

use engine_core::{Transform, Vec3};

use crate::Aabb;

/// Box collider sized in model space and scaled by the entity's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub half_extents: Vec3,
}

impl Collider {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents: half_extents.abs(),
        }
    }

    /// Collider for a body of uniform diameter `size`.
    pub fn cube(size: f32) -> Self {
        Self::new(Vec3::splat(size * 0.5))
    }

    /// World-space box for this frame. Rotation is ignored: the box stays
    /// axis-aligned and is recomputed from the current transform.
    pub fn aabb(&self, transform: &Transform) -> Aabb {
        Aabb::from_center_half_extents(transform.position, self.half_extents * transform.scale)
    }

    /// World-space box with the collider centred on `position` at unit scale.
    pub fn aabb_at(&self, position: Vec3) -> Aabb {
        Aabb::from_center_half_extents(position, self.half_extents)
    }

    /// Height of the centre above the floor when resting on it.
    pub fn rest_height(&self) -> f32 {
        self.half_extents.y
    }
}
