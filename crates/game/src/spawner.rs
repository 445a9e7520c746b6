//! Spawn-position sampling.
//!
//! Positions are drawn uniformly over the ground (kept a body-width inside
//! the edge) and rejected until they satisfy the [`SpawnRules`] distance
//! constraints and clear every obstacle.

use engine_core::{Vec2, Vec3};
use physics::{Aabb, SpatialWorld};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SpawnRules;

/// What is being placed and what it must stay away from.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest<'a> {
    pub rules: SpawnRules,
    pub half_extents: Vec3,
    /// Centre height the entity rests at.
    pub rest_y: f32,
    /// Positions of existing entities of the same kind group.
    pub siblings: &'a [Vec3],
    pub player: Option<Vec3>,
}

/// Seeded random source for spawning and wander decisions.
pub struct Spawner {
    rng: StdRng,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Pick a spawn position for `request`. Falls back to a point on +X
    /// just outside the centre exclusion radius when sampling gives up.
    pub fn sample(&mut self, request: &SpawnRequest, world: &SpatialWorld) -> Vec3 {
        let radius = request.half_extents.x.max(request.half_extents.z);
        let extent = (world.boundary() - radius).max(0.0);

        for _ in 0..request.rules.max_attempts {
            let candidate = Vec3::new(
                self.rng.gen_range(-extent..=extent),
                request.rest_y,
                self.rng.gen_range(-extent..=extent),
            );
            if self.accepts(request, world, candidate) {
                return candidate;
            }
        }

        let fallback = Vec3::new(
            request.rules.min_center_distance + self.rng.gen::<f32>(),
            request.rest_y,
            0.0,
        );
        log::warn!(
            "No spawn position found after {} attempts, using {:?}",
            request.rules.max_attempts,
            fallback
        );
        fallback
    }

    fn accepts(&self, request: &SpawnRequest, world: &SpatialWorld, candidate: Vec3) -> bool {
        let rules = &request.rules;
        if planar_distance(candidate, Vec3::ZERO) < rules.min_center_distance {
            return false;
        }
        if request
            .siblings
            .iter()
            .any(|s| planar_distance(candidate, *s) < rules.min_sibling_distance)
        {
            return false;
        }
        if let Some(player) = request.player {
            if planar_distance(candidate, player) < rules.min_player_distance {
                return false;
            }
        }
        let aabb = Aabb::from_center_half_extents(candidate, request.half_extents);
        !world.intersects_any(&aabb)
    }
}

/// Distance on the ground plane.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}
