//! Per-tick input intents consumed by the simulation.

use glam::{Vec2, Vec3};

/// Snapshot of what the player wants to do this tick.
///
/// The button fields are edge triggers: true only on the tick the
/// button went down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Intents {
    /// Desired ground-plane direction, `x` → world X, `y` → world Z.
    /// Length at most 1.
    pub move_dir: Vec2,
    pub jump: bool,
    pub inhale: bool,
    pub drop: bool,
}

impl Intents {
    /// Move direction lifted into world space on the XZ plane.
    pub fn move_world(&self) -> Vec3 {
        let v = Vec3::new(self.move_dir.x, 0.0, self.move_dir.y);
        if v.length_squared() > 1.0 {
            v.normalize_or_zero()
        } else if v.is_finite() {
            v
        } else {
            Vec3::ZERO
        }
    }

    pub fn is_moving(&self) -> bool {
        self.move_world().length_squared() > 0.0
    }
}
