//! Builds the static arena from its configuration.

use physics::SpatialWorld;

use crate::config::ArenaConfig;

/// Walls and trees as one immutable `SpatialWorld`.
pub fn build_arena(config: &ArenaConfig) -> SpatialWorld {
    SpatialWorld::build(
        &config.wall_specs(),
        &config.tree_specs(),
        config.obstacle_scale,
        config.boundary(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Vec3;
    use physics::{Aabb, ObstacleKind};

    #[test]
    fn default_arena_has_walls_and_trees() {
        let world = build_arena(&ArenaConfig::default());
        let obstacles = world.obstacles();
        assert_eq!(obstacles.len(), 8);
        assert_eq!(obstacles.iter().filter(|o| o.kind == ObstacleKind::Wall).count(), 4);
        assert_eq!(world.boundary(), 25.0);
    }

    #[test]
    fn centre_is_clear_and_trees_block() {
        let world = build_arena(&ArenaConfig::default());
        let centre = Aabb::from_center_half_extents(Vec3::new(0.0, 0.75, 0.0), Vec3::splat(0.75));
        assert!(!world.intersects_any(&centre));
        let at_tree = Aabb::from_center_half_extents(Vec3::new(8.0, 0.75, 5.0), Vec3::splat(0.75));
        assert!(world.intersects_any(&at_tree));
    }

    #[test]
    fn walls_stop_players_leaving() {
        let world = build_arena(&ArenaConfig::default());
        let near_edge = Aabb::from_center_half_extents(Vec3::new(24.5, 0.75, 0.0), Vec3::splat(0.75));
        assert!(world.intersects_any(&near_edge));
    }
}
