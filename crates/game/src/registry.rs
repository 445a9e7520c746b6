//! Dynamic entity storage.
//!
//! Components live in a `hecs::World`; `order` keeps spawn order so every
//! scan (inhale targeting, pickup, stomp) has a defined tie-break.
//! Replacements append to the end.

use engine_core::{BeingConsumed, Dead, EntityKind, Held, Thrown, Transform, Vec3, Velocity};
use hecs::{Component, Entity, World};
use physics::{Aabb, Collider};

#[derive(Default)]
pub struct EntityRegistry {
    world: World,
    order: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Entities in spawn order, including ones marked dead this step.
    pub fn order(&self) -> &[Entity] {
        &self.order
    }

    /// Spawn the common component set and record spawn order.
    pub fn spawn(&mut self, kind: EntityKind, position: Vec3, collider: Collider) -> Entity {
        let entity = self.world.spawn((
            kind,
            Transform::from_position(position),
            Velocity::default(),
            collider,
        ));
        self.order.push(entity);
        entity
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.world.entity(entity).map(|e| e.has::<T>()).unwrap_or(false)
    }

    /// Present and not pending removal.
    pub fn is_live(&self, entity: Entity) -> bool {
        self.contains(entity) && !self.has::<Dead>(entity)
    }

    pub fn kind(&self, entity: Entity) -> Option<EntityKind> {
        self.world.get::<&EntityKind>(entity).ok().map(|k| *k)
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.transform(entity).map(|t| t.position)
    }

    pub fn velocity(&self, entity: Entity) -> Option<Vec3> {
        self.world.get::<&Velocity>(entity).ok().map(|v| v.linear)
    }

    /// Collision box at the entity's current position, unscaled.
    pub fn aabb(&self, entity: Entity) -> Option<Aabb> {
        let transform = self.world.get::<&Transform>(entity).ok()?;
        let collider = self.world.get::<&Collider>(entity).ok()?;
        Some(collider.aabb_at(transform.position))
    }

    /// Move an entity. Returns false if it no longer exists.
    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> bool {
        match self.world.get::<&mut Transform>(entity) {
            Ok(mut t) => {
                t.position = position;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_velocity(&mut self, entity: Entity, linear: Vec3) -> bool {
        match self.world.get::<&mut Velocity>(entity) {
            Ok(mut v) => {
                v.linear = linear;
                true
            }
            Err(_) => false,
        }
    }

    /// Live entities of `kind`, in spawn order.
    pub fn live_of(&self, kind: EntityKind) -> Vec<Entity> {
        self.order
            .iter()
            .copied()
            .filter(|&e| self.is_live(e) && self.kind(e) == Some(kind))
            .collect()
    }

    /// Enemies that take part in AI and collision: live and not being consumed.
    pub fn active_enemies(&self) -> Vec<Entity> {
        self.live_of(EntityKind::Enemy)
            .into_iter()
            .filter(|&e| !self.has::<BeingConsumed>(e))
            .collect()
    }

    /// Items lying still on the ground: not held, not in flight.
    pub fn resting_items(&self) -> Vec<Entity> {
        self.order
            .iter()
            .copied()
            .filter(|&e| {
                self.is_live(e)
                    && self.kind(e).map_or(false, |k| k.is_item())
                    && !self.has::<Held>(e)
                    && !self.has::<Thrown>(e)
            })
            .collect()
    }

    /// Live entities of `kind` whether or not they are busy.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.live_of(kind).len()
    }

    /// Tag an entity for removal at the end of the step. Returns false if it
    /// was already gone or already marked.
    pub fn mark_dead(&mut self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        self.world.insert_one(entity, Dead).is_ok()
    }

    /// Remove every entity tagged `Dead`, returning what was removed in
    /// spawn order.
    pub fn reap(&mut self) -> Vec<(Entity, EntityKind)> {
        let mut removed = Vec::new();
        let world = &mut self.world;
        self.order.retain(|&e| {
            let dead = world.entity(e).map(|r| r.has::<Dead>()).unwrap_or(true);
            if dead {
                if let Ok(kind) = world.get::<&EntityKind>(e).map(|k| *k) {
                    removed.push((e, kind));
                }
                let _ = world.despawn(e);
            }
            !dead
        });
        removed
    }
}
