//! Axis-aligned bounding boxes.

use engine_core::Vec3;

/// Axis-aligned bounding box.
///
/// A box is either well-formed (`min <= max` on every axis) or empty.
/// The empty box has no volume and never intersects anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The canonical empty box.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Build a box from two corners in any order. Non-finite corners give
    /// the empty box.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        if !a.is_finite() || !b.is_finite() {
            return Self::EMPTY;
        }
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Build a box centred on `center`. Negative extents are taken as
    /// their absolute value; non-finite input gives the empty box.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        if !center.is_finite() || !half.is_finite() {
            return Self::EMPTY;
        }
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// The box moved by `offset`. Empty stays empty.
    pub fn translate(&self, offset: Vec3) -> Self {
        if self.is_empty() || !offset.is_finite() {
            return Self::EMPTY;
        }
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// The box grown by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        Self::new(self.min - Vec3::splat(amount), self.max + Vec3::splat(amount))
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Self::EMPTY,
            (true, false) => *other,
            (false, true) => *self,
            (false, false) => Self {
                min: self.min.min(other.min),
                max: self.max.max(other.max),
            },
        }
    }

    /// Volume covered while translating along `offset`: the union of the
    /// start and end boxes. Exact for motion along a single axis.
    pub fn swept(&self, offset: Vec3) -> Self {
        self.union(&self.translate(offset))
    }

    /// Strict overlap test. Boxes that only touch on a face do not
    /// intersect, so a mover resting flush against a wall can still slide
    /// along it.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        !self.is_empty()
            && point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
