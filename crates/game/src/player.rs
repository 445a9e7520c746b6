//! Player state machine: movement, jump and flight, inhale, stomp and death.

use engine_core::{wrap_angle, EntityKind, Intents, Transform, Vec3};
use hecs::Entity;
use physics::{resolve, Aabb, Collider, Resolution, SpatialWorld, VerticalLimits};

use crate::config::{ArenaConfig, PlayerTunables};
use crate::events::{DeathCause, SimEvent};
use crate::inhale::{self, SuckInStatus};
use crate::items::HeldPower;
use crate::registry::EntityRegistry;

/// Current action mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMode {
    Grounded,
    Jumping,
    Flying,
    Inhaling,
    /// Terminal. Nothing changes the player afterwards.
    Dead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub mode: PlayerMode,
    /// At most one power at a time.
    pub held: Option<HeldPower>,
    pub inhale_time_remaining: f32,
    /// Airborne flaps allowed (set by a jump or a stomp bounce).
    pub can_double_boost: bool,
    /// Enemy currently being sucked in.
    pub swallowing: Option<Entity>,
    pub death: Option<DeathCause>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            mode: PlayerMode::Grounded,
            held: None,
            inhale_time_remaining: 0.0,
            can_double_boost: false,
            swallowing: None,
            death: None,
        }
    }
}

pub struct PlayerController {
    pub transform: Transform,
    pub velocity: Vec3,
    pub collider: Collider,
    pub state: PlayerState,
    spawn_point: Vec3,
}

impl PlayerController {
    /// A player standing at the arena centre.
    pub fn new(config: &ArenaConfig) -> Self {
        let spawn_point = Vec3::new(0.0, config.player_rest_height(), 0.0);
        Self {
            transform: Transform::from_position(spawn_point),
            velocity: Vec3::ZERO,
            collider: Collider::cube(config.player.size),
            state: PlayerState::default(),
            spawn_point,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn mode(&self) -> PlayerMode {
        self.state.mode
    }

    pub fn is_dead(&self) -> bool {
        self.state.mode == PlayerMode::Dead
    }

    /// Inhaling or swallowing: no movement, jumping or lethal contact.
    pub fn is_busy(&self) -> bool {
        self.state.mode == PlayerMode::Inhaling || self.state.swallowing.is_some()
    }

    pub fn held_power(&self) -> Option<engine_core::PowerKind> {
        self.state.held.map(|h| h.power)
    }

    /// Collision box. Visual scale does not affect it.
    pub fn aabb(&self) -> Aabb {
        self.collider.aabb_at(self.transform.position)
    }

    /// Point captured enemies are pulled into.
    pub fn mouth(&self) -> Vec3 {
        self.transform.local_to_world(Vec3::new(0.0, 0.0, self.collider.half_extents.z))
    }

    fn ground_height(&self, config: &ArenaConfig) -> f32 {
        config.ground_y + self.collider.rest_height()
    }

    /// Apply one tick of intents: horizontal velocity, facing, jump and
    /// flight, gravity and inhale start.
    pub fn apply_input(&mut self, intents: &Intents, config: &ArenaConfig, dt: f32, events: &mut Vec<SimEvent>) {
        if self.is_dead() {
            return;
        }
        let tunables = &config.player;
        let busy = self.is_busy();
        let mut target_yaw = self.transform.yaw();

        if busy {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
        } else {
            let dir = intents.move_world();
            let mut speed = tunables.speed;
            if self.state.mode == PlayerMode::Flying {
                speed *= (1.0 - tunables.flight_drag * dt).max(0.0);
            }
            if dir.length_squared() > 0.0 {
                target_yaw = dir.x.atan2(dir.z);
                self.velocity.x = dir.x * speed;
                self.velocity.z = dir.z * speed;
            } else {
                let damping = (1.0 - tunables.idle_damping * dt).max(0.0);
                self.velocity.x *= damping;
                self.velocity.z *= damping;
                if self.velocity.x.abs() < 0.1 {
                    self.velocity.x = 0.0;
                }
                if self.velocity.z.abs() < 0.1 {
                    self.velocity.z = 0.0;
                }
            }
        }

        let current = self.transform.yaw();
        let turn = wrap_angle(target_yaw - current) * tunables.turn_smoothing;
        self.transform.set_yaw(wrap_angle(current + turn));

        if intents.jump && !busy {
            self.jump(tunables);
        }

        match self.state.mode {
            PlayerMode::Flying => {
                self.velocity.y += config.gravity * tunables.float_gravity_scale * dt;
                self.velocity.y = self.velocity.y.max(-tunables.float_speed);
            }
            PlayerMode::Dead => {}
            _ => self.velocity.y += config.gravity * dt,
        }

        if intents.inhale && !busy {
            if let Some(held) = self.state.held {
                log::info!("Used {:?} power", held.power);
                events.push(SimEvent::PowerUsed { power: held.power });
            } else if self.state.mode == PlayerMode::Grounded {
                self.state.mode = PlayerMode::Inhaling;
                self.state.inhale_time_remaining = tunables.inhale_duration;
                self.velocity.x = 0.0;
                self.velocity.z = 0.0;
                log::debug!("Inhale started");
                events.push(SimEvent::InhaleStarted);
            }
        }
    }

    fn jump(&mut self, tunables: &PlayerTunables) {
        match self.state.mode {
            PlayerMode::Grounded => {
                self.velocity.y = tunables.jump_velocity;
                self.state.mode = PlayerMode::Jumping;
                self.state.can_double_boost = true;
            }
            PlayerMode::Jumping | PlayerMode::Flying
                if self.state.can_double_boost && self.transform.position.y < tunables.max_flight_height =>
            {
                self.velocity.y = tunables.flight_boost;
                self.state.mode = PlayerMode::Flying;
            }
            _ => {}
        }
    }

    /// Run the inhale window: count it down and capture the first enemy in
    /// the cone. Runs before movement is applied.
    pub fn update_inhale(
        &mut self,
        registry: &mut EntityRegistry,
        now: f32,
        dt: f32,
        tunables: &PlayerTunables,
        events: &mut Vec<SimEvent>,
    ) {
        if self.state.mode != PlayerMode::Inhaling {
            return;
        }
        self.state.inhale_time_remaining -= dt;

        let target = inhale::find_target(registry, self.transform.position, self.transform.forward(), tunables);
        if let Some(enemy) = target {
            if inhale::capture(registry, enemy, now) {
                log::info!("Captured enemy {:?}", enemy);
                self.state.swallowing = Some(enemy);
                self.state.mode = PlayerMode::Grounded;
                self.state.inhale_time_remaining = 0.0;
                events.push(SimEvent::Captured { enemy });
                return;
            }
        }

        if self.state.inhale_time_remaining <= 0.0 {
            self.state.mode = PlayerMode::Grounded;
            self.state.inhale_time_remaining = 0.0;
            log::debug!("Inhale timed out");
            events.push(SimEvent::InhaleTimedOut);
        }
    }

    /// Resolve this tick's displacement against the arena and update the
    /// airborne flags from the result.
    pub fn move_and_collide(&mut self, world: &SpatialWorld, config: &ArenaConfig, dt: f32) -> Resolution {
        if self.is_dead() {
            return Resolution::default();
        }
        let ground = self.ground_height(config);
        let limits = if self.state.mode == PlayerMode::Flying {
            VerticalLimits::with_ceiling(ground, config.player.max_flight_height)
        } else {
            VerticalLimits::ground(ground)
        };

        let res = resolve(&self.aabb(), self.transform.position.y, self.velocity * dt, world, &[], limits);
        res.apply(&mut self.transform.position, &mut self.velocity);

        match self.state.mode {
            PlayerMode::Jumping | PlayerMode::Flying if res.grounded => {
                self.state.mode = PlayerMode::Grounded;
                self.state.can_double_boost = false;
            }
            PlayerMode::Grounded if !res.grounded => {
                self.state.mode = PlayerMode::Jumping;
            }
            _ => {}
        }
        res
    }

    /// Recover a non-finite pose, then end the episode if the player has
    /// left the arena.
    pub fn check_bounds(&mut self, world: &SpatialWorld, events: &mut Vec<SimEvent>) {
        if self.is_dead() {
            return;
        }
        if !self.transform.is_finite() || !self.velocity.is_finite() {
            log::warn!("Player pose went non-finite, resetting to {:?}", self.spawn_point);
            self.transform = Transform::from_position(self.spawn_point);
            self.velocity = Vec3::ZERO;
            if self.state.mode != PlayerMode::Inhaling {
                self.state.mode = PlayerMode::Grounded;
            }
            events.push(SimEvent::PositionReset {
                entity: None,
                kind: EntityKind::Player,
            });
        }
        if world.is_out_of_bounds(self.transform.position) {
            self.die(DeathCause::FellOffArena, events);
        }
    }

    /// Continue the suck-in of the captured enemy, if any.
    pub fn update_swallow(
        &mut self,
        registry: &mut EntityRegistry,
        now: f32,
        tunables: &PlayerTunables,
        events: &mut Vec<SimEvent>,
    ) {
        let Some(enemy) = self.state.swallowing else {
            return;
        };
        match inhale::advance_suck_in(registry, enemy, self.mouth(), now, tunables) {
            SuckInStatus::InProgress => {}
            SuckInStatus::Lost => {
                log::debug!("Swallow target {:?} is gone", enemy);
                self.state.swallowing = None;
            }
            SuckInStatus::Finished => {
                registry.mark_dead(enemy);
                self.state.swallowing = None;
                log::info!("Swallowed enemy {:?}", enemy);
                events.push(SimEvent::Swallowed { enemy });
            }
        }
    }

    /// Stomp or die on enemy contact. A qualifying stomp is checked first
    /// and never kills the player in the same tick.
    pub fn resolve_enemy_contact(
        &mut self,
        registry: &mut EntityRegistry,
        tunables: &PlayerTunables,
        events: &mut Vec<SimEvent>,
    ) {
        if self.is_dead() {
            return;
        }

        let stomping = self.state.mode != PlayerMode::Flying && self.velocity.y < tunables.stomp_threshold();
        if stomping {
            let probe = self
                .collider
                .aabb_at(self.transform.position - Vec3::Y * tunables.stomp_probe_depth);
            let hit = registry
                .active_enemies()
                .into_iter()
                .find(|&e| registry.aabb(e).map_or(false, |b| b.intersects(&probe)));
            if let Some(enemy) = hit {
                registry.mark_dead(enemy);
                self.velocity.y = tunables.jump_velocity * tunables.stomp_bounce_factor;
                self.state.mode = PlayerMode::Jumping;
                self.state.can_double_boost = true;
                log::info!("Stomped enemy {:?}", enemy);
                events.push(SimEvent::Stomped { enemy });
            }
            return;
        }

        if self.is_busy() {
            return;
        }
        let body = self.aabb();
        let touched = registry
            .active_enemies()
            .into_iter()
            .any(|e| registry.aabb(e).map_or(false, |b| b.intersects(&body)));
        if touched {
            self.die(DeathCause::EnemyContact, events);
        }
    }

    pub fn die(&mut self, cause: DeathCause, events: &mut Vec<SimEvent>) {
        if self.is_dead() {
            return;
        }
        log::info!("Player died: {:?} at {:?}", cause, self.transform.position);
        self.state.mode = PlayerMode::Dead;
        self.state.death = Some(cause);
        self.state.inhale_time_remaining = 0.0;
        self.velocity = Vec3::ZERO;
        events.push(SimEvent::PlayerDied { cause });
    }

    /// Ease the visual scale toward the squash/puff of the current mode.
    pub fn update_visual_scale(&mut self, tunables: &PlayerTunables) {
        let target = match self.state.mode {
            PlayerMode::Inhaling => tunables.inhale_scale,
            PlayerMode::Flying => tunables.puff_scale,
            _ => Vec3::ONE,
        };
        let scale = self.transform.scale.lerp(target, tunables.scale_smoothing);
        self.transform.scale = if scale.distance_squared(target) < 1e-4 { target } else { scale };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{BeingConsumed, Vec2};

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (PlayerController, ArenaConfig, SpatialWorld) {
        let config = ArenaConfig::default();
        let world = SpatialWorld::build(&[], &[], 1.0, config.boundary());
        (PlayerController::new(&config), config, world)
    }

    fn tick(p: &mut PlayerController, intents: Intents, config: &ArenaConfig, world: &SpatialWorld) -> Vec<SimEvent> {
        let mut events = Vec::new();
        p.apply_input(&intents, config, DT, &mut events);
        p.move_and_collide(world, config, DT);
        p.check_bounds(world, &mut events);
        events
    }

    fn jump() -> Intents {
        Intents { jump: true, ..Default::default() }
    }

    #[test]
    fn jump_then_flap_enters_flight() {
        let (mut p, config, world) = setup();
        tick(&mut p, jump(), &config, &world);
        assert_eq!(p.mode(), PlayerMode::Jumping);
        assert!(p.position().y > config.player_rest_height());

        tick(&mut p, jump(), &config, &world);
        assert_eq!(p.mode(), PlayerMode::Flying);
        let boost = config.player.flight_boost;
        assert!(p.velocity.y < boost && p.velocity.y > boost - 1.0);
    }

    #[test]
    fn flapping_again_while_flying_reboosts() {
        let (mut p, config, _) = setup();
        p.transform.position.y = 5.0;
        p.state.mode = PlayerMode::Flying;
        p.state.can_double_boost = true;
        p.velocity.y = -1.0;

        p.apply_input(&jump(), &config, DT, &mut Vec::new());
        let expected = config.player.flight_boost + config.gravity * config.player.float_gravity_scale * DT;
        assert!((p.velocity.y - expected).abs() < 1e-4);
        assert_eq!(p.mode(), PlayerMode::Flying);
    }

    #[test]
    fn flight_drag_slows_horizontal_movement() {
        let (mut grounded, config, _) = setup();
        let mut flying = PlayerController::new(&config);
        flying.transform.position.y = 5.0;
        flying.state.mode = PlayerMode::Flying;

        let walk = Intents { move_dir: Vec2::new(1.0, 0.0), ..Default::default() };
        grounded.apply_input(&walk, &config, DT, &mut Vec::new());
        flying.apply_input(&walk, &config, DT, &mut Vec::new());

        let ground_speed = Vec2::new(grounded.velocity.x, grounded.velocity.z).length();
        let air_speed = Vec2::new(flying.velocity.x, flying.velocity.z).length();
        assert!((ground_speed - config.player.speed).abs() < 1e-5);
        assert!(air_speed < ground_speed);
        let expected = config.player.speed * (1.0 - config.player.flight_drag * DT);
        assert!((air_speed - expected).abs() < 1e-5);
    }

    #[test]
    fn flight_falls_slowly_then_lands() {
        let (mut p, config, world) = setup();
        p.transform.position.y = 5.0;
        p.state.mode = PlayerMode::Flying;
        p.state.can_double_boost = true;
        for _ in 0..600 {
            tick(&mut p, Intents::default(), &config, &world);
            assert!(p.velocity.y >= -config.player.float_speed);
            if p.mode() == PlayerMode::Grounded {
                break;
            }
        }
        assert_eq!(p.mode(), PlayerMode::Grounded);
        assert_eq!(p.position().y, config.player_rest_height());
        assert!(!p.state.can_double_boost);
    }

    #[test]
    fn flying_at_ceiling_does_not_overshoot() {
        let (mut p, config, world) = setup();
        let ceiling = config.player.max_flight_height;
        p.transform.position.y = ceiling;
        p.state.mode = PlayerMode::Flying;
        p.velocity.y = 5.0;
        tick(&mut p, Intents::default(), &config, &world);
        assert_eq!(p.velocity.y, 0.0);
        assert_eq!(p.position().y, ceiling);
    }

    #[test]
    fn no_flap_above_ceiling() {
        let (mut p, config, world) = setup();
        p.transform.position.y = config.player.max_flight_height;
        p.state.mode = PlayerMode::Jumping;
        p.state.can_double_boost = true;
        p.velocity.y = -1.0;
        tick(&mut p, jump(), &config, &world);
        assert_eq!(p.mode(), PlayerMode::Jumping);
    }

    #[test]
    fn idle_damping_snaps_to_zero() {
        let (mut p, config, world) = setup();
        p.velocity = Vec3::new(3.0, 0.0, -3.0);
        for _ in 0..120 {
            tick(&mut p, Intents::default(), &config, &world);
        }
        assert_eq!(p.velocity.x, 0.0);
        assert_eq!(p.velocity.z, 0.0);
    }

    #[test]
    fn facing_turns_toward_movement() {
        let (mut p, config, world) = setup();
        let right = Intents { move_dir: Vec2::new(1.0, 0.0), ..Default::default() };
        for _ in 0..120 {
            tick(&mut p, right, &config, &world);
        }
        assert!((p.transform.yaw() - std::f32::consts::FRAC_PI_2).abs() < 1e-2);
        assert!(p.transform.forward().x > 0.99);
    }

    #[test]
    fn inhale_captures_enemy_ahead() {
        let (mut p, config, _) = setup();
        let mut reg = EntityRegistry::new();
        let enemy = reg.spawn(EntityKind::Enemy, Vec3::new(0.0, 0.75, 2.0), Collider::cube(1.2));
        let mut events = Vec::new();
        p.apply_input(&Intents { inhale: true, ..Default::default() }, &config, DT, &mut events);
        assert_eq!(p.mode(), PlayerMode::Inhaling);
        p.update_inhale(&mut reg, 0.0, DT, &config.player, &mut events);
        assert!(reg.has::<BeingConsumed>(enemy));
        assert_eq!(p.state.swallowing, Some(enemy));
        assert_eq!(p.mode(), PlayerMode::Grounded);
        assert!(p.is_busy());
        assert!(events.contains(&SimEvent::Captured { enemy }));
    }

    #[test]
    fn inhale_times_out_without_target() {
        let (mut p, config, _) = setup();
        let mut reg = EntityRegistry::new();
        let mut events = Vec::new();
        p.apply_input(&Intents { inhale: true, ..Default::default() }, &config, DT, &mut events);
        let ticks = (config.player.inhale_duration / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            p.update_inhale(&mut reg, 0.0, DT, &config.player, &mut events);
        }
        assert_eq!(p.mode(), PlayerMode::Grounded);
        assert!(events.contains(&SimEvent::InhaleTimedOut));
    }

    #[test]
    fn inhale_with_power_uses_it_instead() {
        let (mut p, config, _) = setup();
        let mut reg = EntityRegistry::new();
        let sword = reg.spawn(EntityKind::ItemSword, Vec3::ZERO, Collider::cube(0.4));
        p.state.held = Some(HeldPower { power: engine_core::PowerKind::Sword, item: sword });
        let mut events = Vec::new();
        p.apply_input(&Intents { inhale: true, ..Default::default() }, &config, DT, &mut events);
        assert_eq!(p.mode(), PlayerMode::Grounded);
        assert_eq!(events, vec![SimEvent::PowerUsed { power: engine_core::PowerKind::Sword }]);
    }

    #[test]
    fn enemy_touch_kills_unless_inhaling() {
        let (mut p, config, _) = setup();
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::Enemy, Vec3::new(1.0, 0.6, 0.0), Collider::cube(1.2));
        p.state.mode = PlayerMode::Inhaling;
        p.resolve_enemy_contact(&mut reg, &config.player, &mut Vec::new());
        assert!(!p.is_dead());

        p.state.mode = PlayerMode::Grounded;
        let mut events = Vec::new();
        p.resolve_enemy_contact(&mut reg, &config.player, &mut events);
        assert!(p.is_dead());
        assert_eq!(p.state.death, Some(DeathCause::EnemyContact));
        assert_eq!(events, vec![SimEvent::PlayerDied { cause: DeathCause::EnemyContact }]);
    }

    #[test]
    fn fast_fall_onto_enemy_stomps() {
        let (mut p, config, _) = setup();
        let mut reg = EntityRegistry::new();
        let enemy = reg.spawn(EntityKind::Enemy, Vec3::new(0.0, 0.6, 0.0), Collider::cube(1.2));
        p.transform.position.y = 1.8;
        p.state.mode = PlayerMode::Jumping;
        p.velocity.y = -10.0;
        let mut events = Vec::new();
        p.resolve_enemy_contact(&mut reg, &config.player, &mut events);
        assert!(!p.is_dead());
        assert!(!reg.is_live(enemy));
        assert!((p.velocity.y - 14.0 * 0.6).abs() < 1e-5);
        assert_eq!(events, vec![SimEvent::Stomped { enemy }]);
    }

    #[test]
    fn slow_fall_onto_enemy_kills() {
        let (mut p, config, _) = setup();
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::Enemy, Vec3::new(0.0, 0.6, 0.0), Collider::cube(1.2));
        p.transform.position.y = 1.8;
        p.state.mode = PlayerMode::Jumping;
        p.velocity.y = -3.0;
        p.resolve_enemy_contact(&mut reg, &config.player, &mut Vec::new());
        assert!(p.is_dead());
    }

    #[test]
    fn leaving_the_arena_is_fatal() {
        let (mut p, config, world) = setup();
        p.transform.position.x = 24.95;
        p.state.mode = PlayerMode::Flying;
        let events = tick(&mut p, Intents { move_dir: Vec2::new(1.0, 0.0), ..Default::default() }, &config, &world);
        assert!(p.is_dead());
        assert!(events.contains(&SimEvent::PlayerDied { cause: DeathCause::FellOffArena }));

        // Dead is terminal.
        let before = p.position();
        tick(&mut p, jump(), &config, &world);
        assert_eq!(p.position(), before);
        assert_eq!(p.mode(), PlayerMode::Dead);
    }

    #[test]
    fn nan_pose_resets_to_spawn() {
        let (mut p, config, world) = setup();
        p.transform.position = Vec3::new(f32::NAN, 1.0, 0.0);
        let events = tick(&mut p, Intents::default(), &config, &world);
        assert!(!p.is_dead());
        assert_eq!(p.position(), Vec3::new(0.0, config.player_rest_height(), 0.0));
        assert!(events.contains(&SimEvent::PositionReset { entity: None, kind: EntityKind::Player }));
    }

    #[test]
    fn visual_scale_eases_to_puff() {
        let (mut p, config, _) = setup();
        p.state.mode = PlayerMode::Flying;
        for _ in 0..200 {
            p.update_visual_scale(&config.player);
        }
        assert_eq!(p.transform.scale, config.player.puff_scale);
    }
}
