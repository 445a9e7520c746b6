//! Common ECS components used across the arena simulation.

use glam::Vec3;

/// Velocity component for moving entities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self { linear }
    }
}

/// The fixed set of entity kinds living in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    ItemSword,
    ItemHelmet,
}

impl EntityKind {
    /// The power an item kind grants when held.
    pub fn power(&self) -> Option<PowerKind> {
        match self {
            EntityKind::ItemSword => Some(PowerKind::Sword),
            EntityKind::ItemHelmet => Some(PowerKind::Helmet),
            EntityKind::Player | EntityKind::Enemy => None,
        }
    }

    pub fn is_item(&self) -> bool {
        self.power().is_some()
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Enemy => "enemy",
            EntityKind::ItemSword => "sword",
            EntityKind::ItemHelmet => "helmet",
        }
    }
}

/// A power granted by holding a ground item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerKind {
    Sword,
    Helmet,
}

impl PowerKind {
    /// The item kind that carries this power.
    pub fn item_kind(&self) -> EntityKind {
        match self {
            PowerKind::Sword => EntityKind::ItemSword,
            PowerKind::Helmet => EntityKind::ItemHelmet,
        }
    }

    /// Where the item sits relative to the holder (holder-local, +Z forward).
    pub fn held_offset(&self) -> Vec3 {
        match self {
            PowerKind::Sword => Vec3::new(0.6, 0.15, 0.3),
            PowerKind::Helmet => Vec3::new(0.0, 0.6, 0.1),
        }
    }
}

// ── Tags ────────────────────────────────────────────────────────────────

/// Attached to the player; follows it and is not independently collidable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Held {
    /// Holder-local offset the renderer draws the item at.
    pub offset: Vec3,
}

/// Mid suck-in: excluded from collision and AI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BeingConsumed;

/// Free projectile under gravity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thrown {
    /// Set once the first ground bounce has happened.
    pub bounced: bool,
}

/// Pending removal at the end of the current step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dead;
