//! Collision geometry for the arena: boxes, static obstacles, and the
//! axis-separated movement resolver.

pub mod aabb;
pub mod collision;
pub mod resolver;
pub mod spatial_world;

pub use aabb::*;
pub use collision::*;
pub use resolver::*;
pub use spatial_world::*;
