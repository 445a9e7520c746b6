//! The frame-stepped arena simulation.
//!
//! One [`Simulation::step`] runs, in this order: clock, player intents,
//! inhale targeting, throw, player movement and bounds, enemy AI, thrown
//! and held items, suck-in, enemy contact (stomp before death), pickup,
//! then reaping with immediate replacement of everything removed.

use engine_core::{BeingConsumed, EntityKind, Held, Intents, Thrown, Time, Transform, Vec3};
use hecs::Entity;
use physics::{Collider, SpatialWorld};
use rand::Rng;

use crate::arena::build_arena;
use crate::config::ArenaConfig;
use crate::enemy::{self, attach_wander, enemy_collider};
use crate::events::{Outcome, SimEvent, StepReport};
use crate::items::{self, item_collider};
use crate::player::{PlayerController, PlayerMode};
use crate::registry::EntityRegistry;
use crate::spawner::{SpawnRequest, Spawner};

/// Renderer-facing mode tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTag {
    Player(PlayerMode),
    Wandering,
    BeingConsumed,
    Resting,
    Held,
    Thrown,
}

/// What an external renderer needs to draw one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderInstance {
    /// `None` for the player, which lives outside the registry.
    pub entity: Option<Entity>,
    pub kind: EntityKind,
    pub mode: ModeTag,
    pub transform: Transform,
    /// Holder-local offset for held items.
    pub attached_offset: Option<Vec3>,
}

pub struct Simulation {
    config: ArenaConfig,
    world: SpatialWorld,
    registry: EntityRegistry,
    player: PlayerController,
    spawner: Spawner,
    time: Time,
    outcome: Outcome,
}

impl Simulation {
    /// Build the arena and spawn the initial population. `config` should
    /// already be validated.
    pub fn new(config: ArenaConfig, seed: u64) -> Self {
        let world = build_arena(&config);
        let player = PlayerController::new(&config);
        let mut sim = Self {
            time: Time::with_max_step(config.max_step),
            config,
            world,
            registry: EntityRegistry::new(),
            player,
            spawner: Spawner::new(seed),
            outcome: Outcome::Running,
        };

        let mut events = Vec::new();
        for _ in 0..sim.config.enemies.max_enemies {
            sim.spawn(EntityKind::Enemy, &mut events);
        }
        sim.spawn(EntityKind::ItemSword, &mut events);
        sim.spawn(EntityKind::ItemHelmet, &mut events);
        log::info!(
            "Simulation ready: {} enemies, {} items, seed {}",
            sim.registry.count(EntityKind::Enemy),
            sim.registry.count(EntityKind::ItemSword) + sim.registry.count(EntityKind::ItemHelmet),
            seed
        );
        sim
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn world(&self) -> &SpatialWorld {
        &self.world
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Advance the simulation by `dt` seconds (clamped to `[0, max_step]`).
    ///
    /// Once the episode has ended every further step is a no-op that
    /// reports the same outcome.
    pub fn step(&mut self, intents: &Intents, dt: f32) -> StepReport {
        if self.outcome.is_ended() {
            return StepReport {
                events: Vec::new(),
                outcome: self.outcome,
            };
        }

        let dt = self.time.advance(dt);
        let now = self.time.elapsed_seconds();
        let mut events = Vec::new();

        self.player.apply_input(intents, &self.config, dt, &mut events);
        self.player
            .update_inhale(&mut self.registry, now, dt, &self.config.player, &mut events);
        if intents.drop && !self.player.is_dead() {
            items::throw_held(
                &mut self.registry,
                &self.player.transform,
                &mut self.player.state.held,
                &self.config.items,
                &mut events,
            );
        }
        self.player.move_and_collide(&self.world, &self.config, dt);
        self.player.check_bounds(&self.world, &mut events);

        self.update_enemies(dt, &mut events);
        self.update_items(dt, &mut events);
        self.player
            .update_swallow(&mut self.registry, now, &self.config.player, &mut events);

        self.player
            .resolve_enemy_contact(&mut self.registry, &self.config.player, &mut events);
        if !self.player.is_dead() {
            items::try_pickup(
                &mut self.registry,
                &self.player.aabb(),
                &mut self.player.state.held,
                &self.config.items,
                &mut events,
            );
            items::follow_holder(&mut self.registry, &self.player.transform);
        }

        self.reap_and_replenish(&mut events);
        self.player.update_visual_scale(&self.config.player);

        if let Some(cause) = self.player.state.death {
            self.outcome = Outcome::EpisodeEnded(cause);
        }
        StepReport {
            events,
            outcome: self.outcome,
        }
    }

    fn update_enemies(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        let rest_y = self.config.enemy_rest_height();
        let report = enemy::update_enemies(
            &mut self.registry,
            &self.world,
            &self.config.enemies,
            rest_y,
            self.spawner.rng(),
            dt,
        );
        for entity in report.invalid {
            let (position, _) = self.sample_position(EntityKind::Enemy);
            enemy::reset_enemy(
                &mut self.registry,
                entity,
                position,
                self.spawner.rng(),
                &self.config.enemies,
                events,
            );
        }
        for entity in report.escaped {
            log::debug!("Enemy {:?} wandered off the arena", entity);
            self.registry.mark_dead(entity);
        }
    }

    fn update_items(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        let report = items::update_thrown(
            &mut self.registry,
            &self.world,
            &self.config.items,
            self.config.gravity,
            self.config.ground_y,
            dt,
            events,
        );
        for item in report.invalid {
            let Some(kind) = self.registry.kind(item) else {
                continue;
            };
            let (position, _) = self.sample_position(kind);
            items::reset_item(&mut self.registry, item, position, events);
        }
        for item in report.lost {
            log::debug!("Thrown item {:?} left the arena", item);
            self.registry.mark_dead(item);
        }
        items::follow_holder(&mut self.registry, &self.player.transform);
    }

    /// Remove everything marked dead this step and spawn one replacement of
    /// the same kind for each.
    fn reap_and_replenish(&mut self, events: &mut Vec<SimEvent>) {
        for (entity, kind) in self.registry.reap() {
            events.push(SimEvent::Despawned { entity, kind });
            self.spawn(kind, events);
        }
    }

    /// Sample a spawn position for `kind`, returning it with the collider
    /// the entity will use.
    fn sample_position(&mut self, kind: EntityKind) -> (Vec3, Collider) {
        let (rules, collider, siblings) = if kind == EntityKind::Enemy {
            let siblings: Vec<Vec3> = self
                .registry
                .live_of(EntityKind::Enemy)
                .into_iter()
                .filter_map(|e| self.registry.position(e))
                .collect();
            (self.config.enemies.spawn, enemy_collider(&self.config.enemies), siblings)
        } else {
            let siblings: Vec<Vec3> = self
                .registry
                .resting_items()
                .into_iter()
                .filter_map(|e| self.registry.position(e))
                .collect();
            (self.config.items.spawn, item_collider(kind, &self.config.items), siblings)
        };

        let request = SpawnRequest {
            rules,
            half_extents: collider.half_extents,
            rest_y: self.config.ground_y + collider.rest_height(),
            siblings: &siblings,
            player: Some(self.player.position()).filter(|p| p.is_finite()),
        };
        (self.spawner.sample(&request, &self.world), collider)
    }

    fn spawn(&mut self, kind: EntityKind, events: &mut Vec<SimEvent>) -> Option<Entity> {
        if kind == EntityKind::Player {
            log::warn!("The player is not spawned through the registry");
            return None;
        }
        let (position, collider) = self.sample_position(kind);
        let entity = self.registry.spawn(kind, position, collider);

        if kind == EntityKind::Enemy {
            attach_wander(&mut self.registry, entity, self.spawner.rng(), &self.config.enemies);
        } else if let Ok(mut t) = self.registry.world_mut().get::<&mut Transform>(entity) {
            t.set_yaw(self.spawner.rng().gen::<f32>() * std::f32::consts::TAU);
        }

        log::info!("Spawned {} at ({:.1}, {:.1})", kind.name(), position.x, position.z);
        events.push(SimEvent::Spawned { entity, kind, position });
        Some(entity)
    }

    /// Per-entity pose and mode for an external renderer, player first.
    pub fn render_instances(&self) -> Vec<RenderInstance> {
        let mut out = vec![RenderInstance {
            entity: None,
            kind: EntityKind::Player,
            mode: ModeTag::Player(self.player.mode()),
            transform: self.player.transform,
            attached_offset: None,
        }];

        for &entity in self.registry.order() {
            if !self.registry.is_live(entity) {
                continue;
            }
            let (Some(kind), Some(transform)) = (self.registry.kind(entity), self.registry.transform(entity)) else {
                continue;
            };
            let held = self.registry.world().get::<&Held>(entity).ok().map(|h| h.offset);
            let mode = if held.is_some() {
                ModeTag::Held
            } else if self.registry.has::<Thrown>(entity) {
                ModeTag::Thrown
            } else if self.registry.has::<BeingConsumed>(entity) {
                ModeTag::BeingConsumed
            } else if kind == EntityKind::Enemy {
                ModeTag::Wandering
            } else {
                ModeTag::Resting
            };
            out.push(RenderInstance {
                entity: Some(entity),
                kind,
                mode,
                transform,
                attached_offset: held,
            });
        }
        out
    }
}
