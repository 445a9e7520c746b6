//! Transform component and utilities for spatial positioning.

use glam::{Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
///
/// Models face +Z, so a yaw of zero looks down the positive Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform at `position` turned `yaw` radians about +Y.
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
            ..Default::default()
        }
    }

    /// Get the forward direction (positive Z in model space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Heading about +Y in radians, measured from +Z toward +X.
    pub fn yaw(&self) -> f32 {
        let f = self.forward();
        f.x.atan2(f.z)
    }

    /// Replace the rotation with a pure yaw.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.rotation = Quat::from_rotation_y(yaw);
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Transform a point from local space into world space (no scale).
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// True when position, rotation and scale are all finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

/// Wrap an angle into (-π, π].
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    angle %= TAU;
    if angle <= -PI {
        angle += TAU;
    } else if angle > PI {
        angle -= TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn yaw_zero_faces_positive_z() {
        let t = Transform::default();
        assert!((t.forward() - Vec3::Z).length() < 1e-6);
        assert!(t.yaw().abs() < 1e-6);
    }

    #[test]
    fn yaw_quarter_turn_faces_positive_x() {
        let t = Transform::from_position_yaw(Vec3::ZERO, FRAC_PI_2);
        assert!((t.forward() - Vec3::X).length() < 1e-5);
        assert!((t.yaw() - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(3.0 * PI).abs() - PI).abs() < 1e-4);
        assert!((wrap_angle(-3.0 * PI / 2.0) - FRAC_PI_2).abs() < 1e-4);
        assert_eq!(wrap_angle(f32::NAN), 0.0);
    }
}
