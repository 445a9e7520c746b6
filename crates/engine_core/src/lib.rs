//! Core engine types shared by the arena simulation crates.
//!
//! This crate provides the foundational types used across all systems:
//! - Transform and spatial components
//! - Simulated time
//! - Entity kind and tag components for the registry
//! - Per-tick input intents

pub mod components;
pub mod intent;
pub mod time;
pub mod transform;

pub use components::*;
pub use intent::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
