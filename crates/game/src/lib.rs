//! Puffball arena: a single-arena, frame-stepped action simulation.
//!
//! The player walks, jumps, flies, inhales enemies, stomps them and juggles
//! one power item at a time while a constant population of wandering
//! enemies roams the arena. Rendering and device input are external: the
//! host feeds [`engine_core::Intents`] into [`Simulation::step`] and draws
//! [`Simulation::render_instances`].

pub mod arena;
pub mod config;
pub mod enemy;
pub mod events;
pub mod inhale;
pub mod items;
pub mod player;
pub mod registry;
pub mod script;
pub mod simulation;
pub mod spawner;

pub use config::{ArenaConfig, ConfigError};
pub use events::{DeathCause, Outcome, SimEvent, StepReport};
pub use player::{PlayerController, PlayerMode, PlayerState};
pub use simulation::{ModeTag, RenderInstance, Simulation};
