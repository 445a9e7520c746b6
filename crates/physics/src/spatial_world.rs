//! Static arena geometry: obstacle boxes and the arena boundary.

use engine_core::{Vec2, Vec3};

use crate::Aabb;

/// What a static obstacle was built from (for logging and debugging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Wall,
    Tree,
}

/// Placement of one static obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpec {
    /// Centre of the obstacle's footprint at its base.
    pub base: Vec3,
    /// Footprint size along X and Z.
    pub footprint: Vec2,
    /// Height above the base.
    pub height: f32,
}

/// A static obstacle box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub aabb: Aabb,
}

impl Obstacle {
    /// Box for `spec` with footprint and height multiplied by `scale`.
    /// The base stays anchored where it was placed.
    pub fn from_spec(kind: ObstacleKind, spec: &ObstacleSpec, scale: f32) -> Self {
        let half = Vec3::new(spec.footprint.x, 0.0, spec.footprint.y) * 0.5 * scale;
        let top = spec.height * scale;
        Self {
            kind,
            aabb: Aabb::new(
                spec.base - Vec3::new(half.x, 0.0, half.z),
                spec.base + Vec3::new(half.x, top, half.z),
            ),
        }
    }
}

/// Immutable obstacle set plus arena bounds. Built once at setup.
#[derive(Debug, Clone, Default)]
pub struct SpatialWorld {
    obstacles: Vec<Obstacle>,
    boundary: f32,
}

impl SpatialWorld {
    /// Build one box per wall and tree. Deterministic for the same input.
    ///
    /// `boundary` is the half-width of the arena: points with `|x|` or
    /// `|z|` beyond it are out of bounds.
    pub fn build(walls: &[ObstacleSpec], trees: &[ObstacleSpec], scale: f32, boundary: f32) -> Self {
        let obstacles = walls
            .iter()
            .map(|w| Obstacle::from_spec(ObstacleKind::Wall, w, scale))
            .chain(trees.iter().map(|t| Obstacle::from_spec(ObstacleKind::Tree, t, scale)))
            .collect::<Vec<_>>();

        for (i, o) in obstacles.iter().enumerate() {
            log::debug!("Obstacle {} ({:?}) min {:?} max {:?}", i, o.kind, o.aabb.min, o.aabb.max);
        }
        log::info!(
            "Spatial world built: {} walls, {} trees, boundary {:.1}",
            walls.len(),
            trees.len(),
            boundary
        );

        Self {
            obstacles,
            boundary: boundary.abs(),
        }
    }

    /// True iff `aabb` intersects at least one obstacle. Linear scan.
    pub fn intersects_any(&self, aabb: &Aabb) -> bool {
        self.first_intersecting(aabb).is_some()
    }

    /// The first obstacle `aabb` intersects, in build order.
    pub fn first_intersecting(&self, aabb: &Aabb) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.aabb.intersects(aabb))
    }

    /// All obstacles `aabb` intersects.
    pub fn intersecting<'a>(&'a self, aabb: &'a Aabb) -> impl Iterator<Item = &'a Obstacle> + 'a {
        self.obstacles.iter().filter(move |o| o.aabb.intersects(aabb))
    }

    /// True when the point lies beyond the arena boundary on X or Z.
    /// Non-finite points count as out of bounds.
    pub fn is_out_of_bounds(&self, point: Vec3) -> bool {
        !(point.x.abs() <= self.boundary && point.z.abs() <= self.boundary)
    }

    pub fn boundary(&self) -> f32 {
        self.boundary
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}
